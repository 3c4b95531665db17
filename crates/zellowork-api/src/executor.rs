//! Request execution engine.
//!
//! Every public operation funnels through [`RequestExecutor::execute`]:
//!
//! 1. build `base/command?params[&rnd=..][&sid=..]`
//! 2. record the URL into the session (before anything can fail)
//! 3. send through the [`Transport`]
//! 4. normalize the reply into an [`Outcome`]
//!
//! The executor never retries and never panics on server input; each call
//! yields exactly one `Outcome`.

use crate::error::{TransportError, ZelloError};
use crate::session::SessionState;
use crate::transport::{HttpMethod, Transport, TransportRequest, TransportResponse};
use crate::types::{encode_pairs, encode_value, Command, Credential, Outcome};
use log::{debug, warn};
use rand::Rng;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const CACHE_BUSTER_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const CACHE_BUSTER_LEN: usize = 32;
const BODY_SNIPPET_CHARS: usize = 200;

/// Random `[a-z0-9]{32}` token for the `rnd` query parameter.
pub fn cache_buster_token() -> String {
    let mut rng = rand::thread_rng();
    (0..CACHE_BUSTER_LEN)
        .map(|_| CACHE_BUSTER_CHARSET[rng.gen_range(0..CACHE_BUSTER_CHARSET.len())] as char)
        .collect()
}

/// Builds, sends and normalizes commands for one client.
pub struct RequestExecutor {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionState>,
    cache_buster: bool,
}

impl RequestExecutor {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Arc<SessionState>,
        cache_buster: bool,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            cache_buster,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Full command URL, with `sid` attached when given.
    pub fn build_url(&self, command: &Command, sid: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.base_url, command.name());
        let mut query = Vec::new();
        let params = encode_pairs(command.params());
        if !params.is_empty() {
            query.push(params);
        }
        if self.cache_buster {
            query.push(format!("rnd={}", cache_buster_token()));
        }
        if let Some(sid) = sid {
            query.push(format!("sid={}", encode_value(sid)));
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    /// Execute one command and normalize whatever happens into an [`Outcome`].
    pub async fn execute(&self, command: &Command) -> Outcome {
        let sid = match command.credential() {
            Credential::Anonymous => None,
            Credential::Handshake(sid) => sid.clone(),
            Credential::Session => self.session.session_id(),
        };

        let url = self.build_url(command, sid.as_deref());
        self.session.record_url(&url);

        if sid.is_none() && *command.credential() == Credential::Session {
            warn!("ZelloWork command '{}' issued without a session", command.name());
            return Outcome::failure(ZelloError::NotAuthenticated);
        }

        let body = command.form_body();
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        if body.is_some() {
            headers.insert(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            );
        }
        let method = match (command.method(), &body) {
            (HttpMethod::Get, Some(_)) => HttpMethod::Post,
            (method, _) => method,
        };

        debug!("ZelloWork API → {} {}", method, command.name());
        let request = TransportRequest {
            method,
            url,
            headers,
            body,
        };

        match self.transport.send(request).await {
            Ok(response) => {
                let outcome = normalize_response(response);
                match &outcome.error {
                    Some(err) => debug!("ZelloWork API ← {}: {}", command.name(), err),
                    None => debug!("ZelloWork API ← {}: OK", command.name()),
                }
                outcome
            }
            Err(err) => {
                warn!("ZelloWork API {} failed: {}", command.name(), err);
                Outcome::failure(ZelloError::Transport(err))
            }
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("cache_buster", &self.cache_buster)
            .finish()
    }
}

fn body_snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_SNIPPET_CHARS)
        .collect()
}

/// Map a raw transport response onto an [`Outcome`].
pub fn normalize_response(response: TransportResponse) -> Outcome {
    if !response.is_success() {
        return Outcome::failure(ZelloError::Transport(TransportError::status(
            response.status,
            body_snippet(&response.body),
        )));
    }
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(map)) => Outcome::from_response(map),
        Ok(other) => Outcome::failure(ZelloError::MalformedResponse(format!(
            "expected a JSON object, got: {}",
            body_snippet(other.to_string().as_bytes())
        ))),
        Err(e) => Outcome::failure(ZelloError::from(e)),
    }
}
