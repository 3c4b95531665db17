//! Commands, outcomes, and typed parameter helpers for the ZelloWork API.

use crate::error::{ZelloError, ZelloResult};
use crate::hasher;
use crate::transport::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::form_urlencoded::byte_serialize;

/// A parsed server response: string keys, schema-less values.
pub type ResponseMap = serde_json::Map<String, Value>;

// ── Parameters ──────────────────────────────────────────────────────

/// A single command parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(i64),
    Bool(bool),
    /// Sent as repeated `key[]=value` pairs.
    List(Vec<String>),
}

impl ParamValue {
    /// `(encoded key, raw value)` pairs for this value under `key`.
    fn pairs(&self, key: &str) -> Vec<(String, String)> {
        let key = encode_value(key);
        match self {
            Self::Text(s) => vec![(key, s.clone())],
            Self::Number(n) => vec![(key, n.to_string())],
            Self::Bool(b) => vec![(key, b.to_string())],
            Self::List(items) => {
                let list_key = format!("{}[]", key);
                items
                    .iter()
                    .map(|item| (list_key.clone(), item.clone()))
                    .collect()
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[String]> for ParamValue {
    fn from(items: &[String]) -> Self {
        Self::List(items.to_vec())
    }
}

/// Percent-encode a single value the way form bodies and path segments
/// expect (space becomes `+`).
pub fn encode_value(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Render a parameter map as `k=v&k[]=v1&k[]=v2`. Keys and values are
/// both percent-encoded; the list `[]` suffix stays literal. An empty list
/// contributes nothing.
pub fn encode_pairs(map: &BTreeMap<String, ParamValue>) -> String {
    map.iter()
        .flat_map(|(key, value)| value.pairs(key))
        .map(|(k, v)| format!("{}={}", k, encode_value(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Reject an empty name before it is baked into a command path.
pub(crate) fn required_name(what: &str, value: &str) -> ZelloResult<String> {
    if value.trim().is_empty() {
        return Err(ZelloError::InvalidParameter(format!("{} must not be empty", what)));
    }
    Ok(value.to_string())
}

/// Reject an empty list, or a list holding an empty name.
pub(crate) fn required_list<S: AsRef<str>>(what: &str, items: &[S]) -> ZelloResult<Vec<String>> {
    if items.is_empty() {
        return Err(ZelloError::InvalidParameter(format!("{} must not be empty", what)));
    }
    items
        .iter()
        .map(|item| required_name(what, item.as_ref()))
        .collect()
}

// ── Commands ────────────────────────────────────────────────────────

/// Which credential a command travels with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// No credential at all (token fetch).
    Anonymous,
    /// The login step: carries the handshake sid, never the session one.
    Handshake(Option<String>),
    /// Requires the installed session id.
    Session,
}

/// A named server operation plus its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    method: HttpMethod,
    credential: Credential,
    params: BTreeMap<String, ParamValue>,
    form: BTreeMap<String, ParamValue>,
}

impl Command {
    fn new(name: &str, method: HttpMethod) -> Self {
        Self {
            name: name.trim_matches('/').to_string(),
            method,
            credential: Credential::Session,
            params: BTreeMap::new(),
            form: BTreeMap::new(),
        }
    }

    pub fn get(name: &str) -> Self {
        Self::new(name, HttpMethod::Get)
    }

    pub fn post(name: &str) -> Self {
        Self::new(name, HttpMethod::Post)
    }

    pub fn anonymous(mut self) -> Self {
        self.credential = Credential::Anonymous;
        self
    }

    pub fn handshake(mut self, sid: Option<String>) -> Self {
        self.credential = Credential::Handshake(sid);
        self
    }

    /// Add a query parameter. A repeated key replaces the earlier value.
    pub fn param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Add a form body field.
    pub fn form(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.form.insert(key.to_string(), value.into());
        self
    }

    /// Append `/key/value` to the command path.
    pub fn segment(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.name.push('/');
        self.name.push_str(key);
        self.path(value)
    }

    /// Append a bare `/value` to the command path.
    pub fn path(mut self, value: impl std::fmt::Display) -> Self {
        self.name.push('/');
        self.name.push_str(&encode_value(&value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn form_fields(&self) -> &BTreeMap<String, ParamValue> {
        &self.form
    }

    /// Encoded POST body, if the command has form fields.
    pub fn form_body(&self) -> Option<String> {
        Some(encode_pairs(&self.form)).filter(|body| !body.is_empty())
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Normalized result of one call.
///
/// `success` reflects the transport and parse steps; a server-reported
/// failure arrives with `success == true`, the parsed `result`, and an
/// [`ZelloError::Application`] in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub result: Option<ResponseMap>,
    pub error: Option<ZelloError>,
}

impl Outcome {
    pub fn failure(error: ZelloError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }

    /// Wrap a parsed mapping, deriving any application error from its
    /// `status` / `error_code` / `code` fields.
    pub fn from_response(map: ResponseMap) -> Self {
        let error = application_error(&map);
        Self {
            success: true,
            result: Some(map),
            error,
        }
    }

    /// Transport and parse succeeded and the server reported no error.
    pub fn is_ok(&self) -> bool {
        self.success && self.error.is_none()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.result.as_ref().and_then(|m| m.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Turn a successful transport call into a failed outcome, keeping the
    /// parsed result for diagnostics.
    pub fn into_failed(self, error: ZelloError) -> Self {
        Self {
            success: false,
            result: self.result,
            error: Some(error),
        }
    }

    /// The result mapping, or the carried error.
    pub fn into_result(self) -> ZelloResult<ResponseMap> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.result
            .ok_or_else(|| ZelloError::MalformedResponse("empty result".to_string()))
    }
}

fn field_text(map: &ResponseMap, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn application_error(map: &ResponseMap) -> Option<ZelloError> {
    let description = || field_text(map, "error_description").unwrap_or_default();

    if let Some(status) = field_text(map, "status") {
        if status.eq_ignore_ascii_case("OK") {
            return None;
        }
        let code = field_text(map, "code").unwrap_or_default();
        return Some(ZelloError::application(code, status));
    }
    if let Some(code) = field_text(map, "error_code") {
        return Some(ZelloError::application(code, description()));
    }
    match field_text(map, "code") {
        Some(code) if code != "200" => Some(ZelloError::application(code, description())),
        _ => None,
    }
}

// ── Typed parameter helpers ─────────────────────────────────────────

/// Filters for `user/get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    pub username: Option<String>,
    #[serde(default)]
    pub is_gateway: bool,
    pub max: Option<u32>,
    pub start: Option<u32>,
    pub channel: Option<String>,
}

impl UserQuery {
    pub fn username(name: &str) -> Self {
        Self {
            username: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn in_channel(channel: &str) -> Self {
        Self {
            channel: Some(channel.to_string()),
            ..Default::default()
        }
    }

    pub fn gateways() -> Self {
        Self {
            is_gateway: true,
            ..Default::default()
        }
    }

    pub fn page(mut self, max: u32, start: u32) -> Self {
        self.max = Some(max);
        self.start = Some(start);
        self
    }
}

/// Filters for `channel/get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelQuery {
    pub name: Option<String>,
    pub max: Option<u32>,
    pub start: Option<u32>,
}

impl ChannelQuery {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn page(mut self, max: u32, start: u32) -> Self {
        self.max = Some(max);
        self.start = Some(start);
        self
    }
}

/// Attributes accepted by `user/save`. Unknown keys pass through in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    pub name: String,
    /// MD5 hex of the password, as the server stores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limited_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<bool>,
    /// `true` refuses to update an existing user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl UserAttributes {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Store the md5 hex of a plain-text password.
    pub fn with_plain_password(mut self, password: &str) -> Self {
        self.password = Some(hasher::md5_hex(password.as_bytes()));
        self
    }

    /// Build from a raw key/value mapping. Boolean keys accept
    /// `true`/`false`/`1`/`0`.
    pub fn from_map(map: &BTreeMap<String, String>) -> ZelloResult<Self> {
        let mut attrs = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "name" => attrs.name = value.clone(),
                "password" => attrs.password = Some(value.clone()),
                "email" => attrs.email = Some(value.clone()),
                "full_name" => attrs.full_name = Some(value.clone()),
                "job" => attrs.job = Some(value.clone()),
                "admin" => attrs.admin = Some(parse_flag(key, value)?),
                "limited_access" => attrs.limited_access = Some(parse_flag(key, value)?),
                "gateway" => attrs.gateway = Some(parse_flag(key, value)?),
                "add" => attrs.add = Some(parse_flag(key, value)?),
                _ => {
                    attrs.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(attrs)
    }

    /// Form fields for `user/save`. `name` must be non-empty.
    pub fn to_form(&self) -> ZelloResult<BTreeMap<String, ParamValue>> {
        if self.name.trim().is_empty() {
            return Err(ZelloError::InvalidParameter(
                "user attribute 'name' is required".to_string(),
            ));
        }
        let mut form = BTreeMap::new();
        form.insert("name".to_string(), ParamValue::from(self.name.as_str()));
        let text = [
            ("password", &self.password),
            ("email", &self.email),
            ("full_name", &self.full_name),
            ("job", &self.job),
        ];
        for (key, value) in text {
            if let Some(v) = value {
                form.insert(key.to_string(), ParamValue::from(v.as_str()));
            }
        }
        let flags = [
            ("admin", self.admin),
            ("limited_access", self.limited_access),
            ("gateway", self.gateway),
            ("add", self.add),
        ];
        for (key, value) in flags {
            if let Some(v) = value {
                form.insert(key.to_string(), ParamValue::Bool(v));
            }
        }
        for (key, value) in &self.extra {
            form.entry(key.clone())
                .or_insert_with(|| ParamValue::from(value.as_str()));
        }
        Ok(form)
    }
}

fn parse_flag(key: &str, value: &str) -> ZelloResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(ZelloError::InvalidParameter(format!(
            "'{}' expects true/false, got '{}'",
            key, other
        ))),
    }
}

/// Channel role settings, sent as the JSON `settings` form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_disconnect: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_alerts: Option<bool>,
    /// Roles this role may talk to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<String>>,
}

impl RoleSettings {
    pub fn to_json(&self) -> ZelloResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ZelloError::InvalidParameter(format!("role settings: {}", e)))
    }
}
