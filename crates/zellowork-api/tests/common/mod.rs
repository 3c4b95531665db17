#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zellowork_api::{
    Transport, TransportError, TransportRequest, TransportResponse, ZelloClient, ZelloConfig,
};

pub enum Script {
    Json(Value),
    Raw(u16, &'static str),
    Fail(TransportError),
}

/// In-memory server: replies are chosen by command path prefix.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, Script)>>,
    requests: Mutex<Vec<TransportRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, prefix: &str, script: Script) -> Self {
        self.routes.lock().unwrap().push((prefix.to_string(), script));
        self
    }

    /// Sleep before answering, so calls overlap in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn reply(&self, path: &str) -> Result<TransportResponse, TransportError> {
        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(prefix, _)| path.starts_with(prefix.as_str())) {
            Some((_, Script::Json(v))) => Ok(TransportResponse {
                status: 200,
                body: serde_json::to_vec(v).unwrap(),
            }),
            Some((_, Script::Raw(status, body))) => Ok(TransportResponse {
                status: *status,
                body: body.as_bytes().to_vec(),
            }),
            Some((_, Script::Fail(e))) => Err(e.clone()),
            None => Err(TransportError::connect(format!("no route for {}", path))),
        }
    }
}

pub fn command_path(url: &str) -> String {
    let no_query = url.split('?').next().unwrap_or(url);
    let rest = no_query.split_once("://").map(|(_, r)| r).unwrap_or(no_query);
    rest.split_once('/').map(|(_, p)| p.to_string()).unwrap_or_default()
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let path = command_path(&request.url);
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply(&path)
    }
}

pub const HOST: &str = "zello.test";
pub const API_KEY: &str = "KEY456";

pub fn client_with(transport: Arc<ScriptedTransport>, session_id: Option<&str>) -> ZelloClient {
    let mut config = ZelloConfig::new(HOST, API_KEY);
    config.session_id = session_id.map(str::to_string);
    ZelloClient::with_transport(config, transport).unwrap()
}
