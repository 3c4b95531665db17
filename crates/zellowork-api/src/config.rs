//! Client configuration: server address, API key, and transport settings.

use crate::error::{ZelloError, ZelloResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const ENV_HOST: &str = "ZELLO_HOST";
pub const ENV_API_KEY: &str = "ZELLO_API_KEY";
pub const ENV_SESSION_ID: &str = "ZELLO_SESSION_ID";
pub const ENV_PROXY: &str = "ZELLO_PROXY";

const DEFAULT_USER_AGENT: &str = concat!("zellowork-api/", env!("CARGO_PKG_VERSION"));

/// Connection settings for one ZelloWork server.
#[derive(Clone, Serialize, Deserialize)]
pub struct ZelloConfig {
    /// Server hostname, IP, or full base URL (`https://acme.zellowork.com`).
    pub host: String,
    /// API key issued by the server's admin console.
    pub api_key: String,
    /// Previously obtained session id to resume without logging in again.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Scheme prepended when `host` carries none.
    #[serde(default = "default_scheme")]
    pub default_scheme: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Skip TLS certificate verification (self-hosted servers).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// HTTP(S) proxy URL.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Append a random `rnd` query parameter to every command URL.
    #[serde(default)]
    pub cache_buster: bool,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ZelloConfig {
    pub fn new(host: &str, api_key: &str) -> Self {
        Self {
            host: host.to_string(),
            api_key: api_key.to_string(),
            session_id: None,
            default_scheme: default_scheme(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
            proxy: None,
            cache_buster: false,
        }
    }

    /// Resume an existing session instead of authenticating.
    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    /// Resolve configuration from `ZELLO_*` environment variables.
    pub fn from_environment() -> Option<Self> {
        let host = std::env::var(ENV_HOST).ok()?;
        let api_key = std::env::var(ENV_API_KEY).ok()?;
        let mut config = Self::new(&host, &api_key);
        config.session_id = std::env::var(ENV_SESSION_ID).ok().filter(|s| !s.is_empty());
        config.proxy = std::env::var(ENV_PROXY).ok().filter(|s| !s.is_empty());
        Some(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ZelloResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ZelloConfig = serde_json::from_str(&raw)
            .map_err(|e| ZelloError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Base URL every command path is appended to, without trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("{}://{}", self.default_scheme, host)
        }
    }

    pub fn validate(&self) -> ZelloResult<()> {
        if self.host.trim().is_empty() {
            return Err(ZelloError::Config("Host is required".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(ZelloError::Config("API key is required".to_string()));
        }
        if self.default_scheme != "http" && self.default_scheme != "https" {
            return Err(ZelloError::Config(format!(
                "Unsupported scheme '{}'",
                self.default_scheme
            )));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(ZelloError::Config("Timeouts must be non-zero".to_string()));
        }
        url::Url::parse(&self.base_url())?;
        if let Some(ref proxy) = self.proxy {
            url::Url::parse(proxy)
                .map_err(|e| ZelloError::Config(format!("Invalid proxy '{}': {}", proxy, e)))?;
        }
        Ok(())
    }
}

impl fmt::Debug for ZelloConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZelloConfig")
            .field("host", &self.host)
            .field("api_key", &"<redacted>")
            .field("session_id", &self.session_id.as_ref().map(|_| "<set>"))
            .field("default_scheme", &self.default_scheme)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("proxy", &self.proxy)
            .field("cache_buster", &self.cache_buster)
            .finish()
    }
}
