//! Per-client session state: the installed session id and the last URL hit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Snapshot of a client's session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Option<String>,
    /// Last command URL built, recorded before dispatch.
    pub last_url: Option<String>,
    /// Who authenticated, when the id came from `authenticate`.
    pub username: Option<String>,
    pub authenticated_at: Option<DateTime<Utc>>,
}

/// Shared, interior-mutable [`Session`] owned by one client.
///
/// Reads and writes never hold the lock across an await point.
#[derive(Debug, Default)]
pub struct SessionState {
    inner: RwLock<Session>,
}

impl SessionState {
    pub fn new(session_id: Option<String>) -> Self {
        Self {
            inner: RwLock::new(Session {
                session_id: session_id.filter(|s| !s.is_empty()),
                ..Default::default()
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_id(&self) -> Option<String> {
        self.read().session_id.clone()
    }

    pub fn last_url(&self) -> Option<String> {
        self.read().last_url.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().session_id.is_some()
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn record_url(&self, url: &str) {
        self.write().last_url = Some(url.to_string());
    }

    /// Install the id produced by a successful login.
    pub fn install(&self, session_id: &str, username: &str) {
        let mut session = self.write();
        session.session_id = Some(session_id.to_string());
        session.username = Some(username.to_string());
        session.authenticated_at = Some(Utc::now());
    }

    /// Resume with an externally obtained id.
    pub fn set_session_id(&self, session_id: Option<String>) {
        let mut session = self.write();
        session.session_id = session_id.filter(|s| !s.is_empty());
        session.username = None;
        session.authenticated_at = None;
    }

    /// Forget the session id. `last_url` survives for diagnostics.
    pub fn clear(&self) {
        let mut session = self.write();
        session.session_id = None;
        session.username = None;
        session.authenticated_at = None;
    }
}
