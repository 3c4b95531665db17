//! # zellowork-api – ZelloWork server administration client
//!
//! Async client for the ZelloWork admin HTTP API: challenge/response login,
//! session handling, and user, channel and channel-role management.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  ZelloService  (service.rs)                      │
//! │  └── labelled sessions → ZelloClient             │
//! ├──────────────────────────────────────────────────┤
//! │  ZelloClient  (client.rs)                        │
//! │  ├── users.rs · channels.rs · roles.rs           │
//! │  ├── AuthenticationFlow / logout  (auth.rs)      │
//! │  └── CallbackContext  (dispatch.rs)              │
//! ├──────────────────────────────────────────────────┤
//! │  RequestExecutor  (executor.rs)                  │
//! │  ├── URL + sid + form body                       │
//! │  ├── SessionState  (session.rs)                  │
//! │  └── Outcome normalization                       │
//! ├──────────────────────────────────────────────────┤
//! │  Transport  (transport.rs)  ← reqwest by default │
//! ├──────────────────────────────────────────────────┤
//! │  RequestSigner (signing.rs) · md5 (hasher.rs)    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use zellowork_api::{ChannelQuery, ZelloClient, ZelloConfig};
//!
//! # async fn run() -> Result<(), zellowork_api::ZelloError> {
//! let client = ZelloClient::new(ZelloConfig::new("acme.zellowork.com", "API-KEY"))?;
//! let login = client.authenticate("admin", "password").await;
//! if let Some(err) = login.error {
//!     return Err(err);
//! }
//! let channels = client.get_channels(&ChannelQuery::default()).await.into_result()?;
//! println!("{:?}", channels.get("channels"));
//! client.logout().await;
//! # Ok(())
//! # }
//! ```

// ── Sub-modules ─────────────────────────────────────────────────────────

pub mod error;
pub mod config;
pub mod hasher;
pub mod signing;
pub mod types;
pub mod session;
pub mod transport;
pub mod executor;
pub mod dispatch;
pub mod auth;
pub mod client;

// API surface
pub mod users;
pub mod channels;
pub mod roles;

pub mod service;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use auth::{AuthState, AuthenticationFlow};
pub use client::ZelloClient;
pub use config::ZelloConfig;
pub use error::{TransportError, TransportErrorKind, ZelloError, ZelloResult};
pub use service::{ZelloService, ZelloServiceState, ZelloSessionInfo};
pub use session::Session;
pub use transport::{
    HttpMethod, ReqwestTransport, Transport, TransportRequest, TransportResponse,
};
pub use types::{
    ChannelQuery, Command, Outcome, ParamValue, ResponseMap, RoleSettings, UserAttributes,
    UserQuery,
};
