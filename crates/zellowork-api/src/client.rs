//! The ZelloWork API client.
//!
//! `ZelloClient` is cheap to clone; clones share one session, one transport
//! and one callback context. Every operation comes in two shapes:
//!
//! * `async fn ...() -> Outcome` for callers already inside a runtime;
//! * `dispatch` / `authenticate_with` / `logout_with`, which return
//!   immediately and deliver the outcome to a callback. Callbacks for one
//!   client run one at a time, in completion order.

use crate::auth::{self, AuthenticationFlow};
use crate::config::ZelloConfig;
use crate::dispatch::{Callback, CallbackContext};
use crate::error::ZelloResult;
use crate::executor::RequestExecutor;
use crate::session::{Session, SessionState};
use crate::signing::RequestSigner;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Command, Outcome};
use log::info;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct ClientInner {
    config: ZelloConfig,
    executor: RequestExecutor,
    signer: RequestSigner,
    callbacks: OnceLock<CallbackContext>,
    /// Runtime the client was built in, if any.
    runtime: Option<Handle>,
}

#[derive(Debug, Clone)]
pub struct ZelloClient {
    inner: Arc<ClientInner>,
}

impl ZelloClient {
    /// Build a client using the default HTTP transport.
    pub fn new(config: ZelloConfig) -> ZelloResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build a client over any [`Transport`].
    pub fn with_transport(config: ZelloConfig, transport: Arc<dyn Transport>) -> ZelloResult<Self> {
        config.validate()?;
        let base_url = config.base_url();
        let session = Arc::new(SessionState::new(config.session_id.clone()));
        let executor = RequestExecutor::new(&base_url, transport, session, config.cache_buster);
        let signer = RequestSigner::new(&config.api_key);
        info!("ZelloWork client created for {}", base_url);

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                executor,
                signer,
                callbacks: OnceLock::new(),
                runtime: Handle::try_current().ok(),
            }),
        })
    }

    // ── Session ─────────────────────────────────────────────────────

    pub fn config(&self) -> &ZelloConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &str {
        self.inner.executor.base_url()
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner.executor.session().session_id()
    }

    /// URL of the most recent command, including failed ones.
    pub fn last_url(&self) -> Option<String> {
        self.inner.executor.session().last_url()
    }

    pub fn session(&self) -> Session {
        self.inner.executor.session().snapshot()
    }

    /// Resume with a session id obtained elsewhere, or drop it with `None`.
    pub fn set_session_id(&self, session_id: Option<String>) {
        self.inner.executor.session().set_session_id(session_id);
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.executor.session().is_authenticated()
    }

    // ── Async API ───────────────────────────────────────────────────

    pub async fn execute(&self, command: Command) -> Outcome {
        self.inner.executor.execute(&command).await
    }

    /// Execute a command whose construction may have been rejected.
    pub(crate) async fn execute_built(&self, command: ZelloResult<Command>) -> Outcome {
        match command {
            Ok(command) => self.execute(command).await,
            Err(err) => Outcome::failure(err),
        }
    }

    /// Run the token → signed login handshake and install the session id.
    pub async fn authenticate(&self, username: &str, password: &str) -> Outcome {
        AuthenticationFlow::new(&self.inner.executor, &self.inner.signer)
            .run(username, password)
            .await
    }

    pub async fn logout(&self) -> Outcome {
        auth::logout(&self.inner.executor).await
    }

    // ── Callback API ────────────────────────────────────────────────

    fn runtime(&self) -> Handle {
        self.inner.runtime.clone().unwrap_or_else(Handle::current)
    }

    fn callbacks(&self, runtime: &Handle) -> &CallbackContext {
        self.inner
            .callbacks
            .get_or_init(|| CallbackContext::spawn(runtime))
    }

    fn spawn_delivery<F>(&self, work: F, callback: Callback) -> JoinHandle<()>
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let runtime = self.runtime();
        let callbacks = self.callbacks(&runtime).clone();
        runtime.spawn(async move {
            let outcome = work.await;
            callbacks.deliver(outcome, callback);
        })
    }

    /// Execute `command` in the background and hand the outcome to
    /// `callback` on this client's callback context.
    ///
    /// Work runs on the runtime the client was built in, so this may be
    /// called from any thread.
    ///
    /// # Panics
    ///
    /// If the client was built outside a tokio runtime and this is also
    /// called outside one.
    pub fn dispatch<F>(&self, command: Command, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let client = self.clone();
        self.spawn_delivery(async move { client.execute(command).await }, Box::new(callback))
    }

    /// Callback form of [`ZelloClient::authenticate`].
    ///
    /// # Panics
    ///
    /// Same runtime requirement as [`ZelloClient::dispatch`].
    pub fn authenticate_with<F>(&self, username: &str, password: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let client = self.clone();
        let username = username.to_string();
        let password = password.to_string();
        self.spawn_delivery(
            async move { client.authenticate(&username, &password).await },
            Box::new(callback),
        )
    }

    /// Callback form of [`ZelloClient::logout`].
    ///
    /// # Panics
    ///
    /// Same runtime requirement as [`ZelloClient::dispatch`].
    pub fn logout_with<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let client = self.clone();
        self.spawn_delivery(async move { client.logout().await }, Box::new(callback))
    }
}
