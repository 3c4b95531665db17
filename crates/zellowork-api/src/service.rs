//! Multi-server session registry.
//!
//! `ZelloService` keeps one authenticated [`ZelloClient`] per labelled
//! session so an embedding application can hold connections to several
//! ZelloWork servers at once.

use crate::client::ZelloClient;
use crate::config::ZelloConfig;
use crate::error::{ZelloError, ZelloResult};
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Thread-safe handle to the service.
pub type ZelloServiceState = Arc<Mutex<ZelloService>>;

/// Public view of one managed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZelloSessionInfo {
    pub id: String,
    pub host: String,
    pub username: Option<String>,
    pub connected_at: DateTime<Utc>,
    /// Server session id currently installed, if any.
    pub session_id: Option<String>,
}

struct ManagedSession {
    info: ZelloSessionInfo,
    client: ZelloClient,
}

pub struct ZelloService {
    sessions: HashMap<String, ManagedSession>,
    transport: Option<Arc<dyn Transport>>,
}

impl ZelloService {
    /// Create a new service wrapped as shared state.
    pub fn new() -> ZelloServiceState {
        Arc::new(Mutex::new(Self {
            sessions: HashMap::new(),
            transport: None,
        }))
    }

    /// Create a service whose clients all use `transport`.
    pub fn with_transport(transport: Arc<dyn Transport>) -> ZelloServiceState {
        Arc::new(Mutex::new(Self {
            sessions: HashMap::new(),
            transport: Some(transport),
        }))
    }

    fn build_client(&self, config: ZelloConfig) -> ZelloResult<ZelloClient> {
        match self.transport {
            Some(ref transport) => ZelloClient::with_transport(config, transport.clone()),
            None => ZelloClient::new(config),
        }
    }

    fn register(&mut self, client: ZelloClient) -> String {
        let id = Uuid::new_v4().to_string();
        let snapshot = client.session();
        let info = ZelloSessionInfo {
            id: id.clone(),
            host: client.base_url().to_string(),
            username: snapshot.username,
            connected_at: Utc::now(),
            session_id: snapshot.session_id,
        };
        self.sessions.insert(id.clone(), ManagedSession { info, client });
        id
    }

    // ── Session management ──────────────────────────────────────────

    /// Authenticate against a server and keep the client under a new label.
    pub async fn connect(
        &mut self,
        config: ZelloConfig,
        username: &str,
        password: &str,
    ) -> ZelloResult<String> {
        let client = self.build_client(config)?;
        let outcome = client.authenticate(username, password).await;
        if let Some(err) = outcome.error {
            return Err(err);
        }
        let id = self.register(client);
        info!("ZelloWork session {} connected as '{}'", id, username);
        Ok(id)
    }

    /// Keep a client that resumes `config.session_id` without logging in.
    pub fn resume(&mut self, config: ZelloConfig) -> ZelloResult<String> {
        if config.session_id.as_deref().map_or(true, str::is_empty) {
            return Err(ZelloError::Config(
                "resume requires a session id".to_string(),
            ));
        }
        let client = self.build_client(config)?;
        let id = self.register(client);
        info!("ZelloWork session {} resumed", id);
        Ok(id)
    }

    pub fn client(&self, id: &str) -> ZelloResult<ZelloClient> {
        self.sessions
            .get(id)
            .map(|s| s.client.clone())
            .ok_or_else(|| ZelloError::SessionNotFound(id.to_string()))
    }

    pub fn list_sessions(&self) -> Vec<ZelloSessionInfo> {
        self.sessions
            .values()
            .map(|s| ZelloSessionInfo {
                session_id: s.client.session_id(),
                ..s.info.clone()
            })
            .collect()
    }

    /// Log out and forget the session. The label is dropped even if the
    /// server rejects the logout.
    pub async fn disconnect(&mut self, id: &str) -> ZelloResult<()> {
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| ZelloError::SessionNotFound(id.to_string()))?;
        let outcome = session.client.logout().await;
        if let Some(err) = outcome.error {
            warn!("ZelloWork session {} logout: {}", id, err);
        }
        info!("ZelloWork session {} disconnected", id);
        Ok(())
    }

    pub async fn disconnect_all(&mut self) {
        let ids: Vec<String> = self.sessions.keys().cloned().collect();
        for id in ids {
            let _ = self.disconnect(&id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockTransport, Reply};
    use serde_json::json;

    fn mock() -> Arc<MockTransport> {
        Arc::new(
            MockTransport::default()
                .route("user/gettoken", Reply::Json(json!({"status": "OK", "token": "t", "sid": "h"})))
                .route("user/login", Reply::Json(json!({"status": "OK", "sid": "live"})))
                .route("user/logout", Reply::Json(json!({"status": "OK"}))),
        )
    }

    #[tokio::test]
    async fn new_service_is_empty() {
        let state = ZelloService::new();
        assert!(state.lock().await.list_sessions().is_empty());
    }

    #[tokio::test]
    async fn connect_list_disconnect() {
        let state = ZelloService::with_transport(mock());
        let mut svc = state.lock().await;

        let id = svc
            .connect(ZelloConfig::new("zello.test", "k"), "admin", "pw")
            .await
            .unwrap();
        let sessions = svc.list_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert_eq!(sessions[0].host, "http://zello.test");
        assert_eq!(sessions[0].username.as_deref(), Some("admin"));
        assert_eq!(sessions[0].session_id.as_deref(), Some("live"));

        let client = svc.client(&id).unwrap();
        svc.disconnect(&id).await.unwrap();
        assert!(client.session_id().is_none());
        assert!(svc.list_sessions().is_empty());
        assert!(matches!(
            svc.disconnect(&id).await,
            Err(ZelloError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_login_registers_nothing() {
        let transport = Arc::new(MockTransport::default().route(
            "user/gettoken",
            Reply::Json(json!({"status": "API key is not valid", "code": "400"})),
        ));
        let state = ZelloService::with_transport(transport);
        let mut svc = state.lock().await;
        let err = svc
            .connect(ZelloConfig::new("zello.test", "k"), "admin", "pw")
            .await
            .unwrap_err();
        assert!(err.is_application());
        assert!(svc.list_sessions().is_empty());
    }

    #[tokio::test]
    async fn resume_requires_session_id() {
        let state = ZelloService::with_transport(mock());
        let mut svc = state.lock().await;
        assert!(svc.resume(ZelloConfig::new("zello.test", "k")).is_err());

        let id = svc
            .resume(ZelloConfig::new("zello.test", "k").with_session_id("old"))
            .unwrap();
        assert_eq!(svc.client(&id).unwrap().session_id().as_deref(), Some("old"));

        svc.disconnect_all().await;
        assert!(svc.list_sessions().is_empty());
    }
}
