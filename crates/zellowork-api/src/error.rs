//! Error types for ZelloWork API operations.
//!
//! Three families reach callers through an [`Outcome`](crate::types::Outcome):
//! transport failures (the request never produced a usable HTTP response),
//! malformed responses (the body was not the expected JSON object), and
//! application errors (the server answered but reported a failure in its own
//! `status` / `code` fields). The remaining variants cover client-side
//! validation and configuration problems detected before anything is sent.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What went wrong below the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportErrorKind {
    /// DNS failure, connection refused, reset.
    Connect,
    /// Connect or read timeout.
    Timeout,
    /// TLS handshake or certificate failure.
    Tls,
    /// The server answered with a non-2xx HTTP status.
    Status(u16),
    /// Anything else reported by the HTTP stack.
    Request,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Timeout => write!(f, "timeout"),
            Self::Tls => write!(f, "tls"),
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Request => write!(f, "request"),
        }
    }
}

/// A failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Status(code), message)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            connect_failure_kind(&e)
        } else if let Some(status) = e.status() {
            TransportErrorKind::Status(status.as_u16())
        } else {
            TransportErrorKind::Request
        };
        Self::new(kind, e.to_string())
    }
}

/// rustls hands handshake and certificate failures to the connector as
/// `io::ErrorKind::InvalidData`. A connect failure with such an error in its
/// source chain is `Tls`; anything else is `Connect`.
fn connect_failure_kind(err: &(dyn std::error::Error + 'static)) -> TransportErrorKind {
    let mut current = Some(err);
    while let Some(e) = current {
        if e
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::InvalidData)
        {
            return TransportErrorKind::Tls;
        }
        current = e.source();
    }
    TransportErrorKind::Connect
}

/// Unified error type for all ZelloWork API operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ZelloError {
    /// The request did not complete at the HTTP level.
    #[error("Transport failure: {0}")]
    Transport(TransportError),
    /// The response body was not a JSON object, or lacked a required field.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// The server reported a failure through its status fields.
    #[error("API error {code}: {description}")]
    Application { code: String, description: String },
    /// A command needing a session was issued with no session id.
    #[error("Not authenticated: call authenticate() or supply a session id first")]
    NotAuthenticated,
    /// A caller-supplied argument was rejected before sending.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// No service session with that label.
    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

impl ZelloError {
    pub fn application(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Application {
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }
}

impl From<TransportError> for ZelloError {
    fn from(e: TransportError) -> Self {
        ZelloError::Transport(e)
    }
}

impl From<reqwest::Error> for ZelloError {
    fn from(e: reqwest::Error) -> Self {
        ZelloError::Transport(TransportError::from(e))
    }
}

impl From<serde_json::Error> for ZelloError {
    fn from(e: serde_json::Error) -> Self {
        ZelloError::MalformedResponse(e.to_string())
    }
}

impl From<url::ParseError> for ZelloError {
    fn from(e: url::ParseError) -> Self {
        ZelloError::Config(format!("Invalid URL: {}", e))
    }
}

impl From<std::io::Error> for ZelloError {
    fn from(e: std::io::Error) -> Self {
        ZelloError::Config(e.to_string())
    }
}

/// Convenience Result alias.
pub type ZelloResult<T> = Result<T, ZelloError>;

/// Convert ZelloError to a String for string-typed error boundaries.
impl From<ZelloError> for String {
    fn from(e: ZelloError) -> Self {
        e.to_string()
    }
}
