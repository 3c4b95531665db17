//! Challenge/response login and logout.
//!
//! ```text
//! Idle → TokenRequested ── user/gettoken (no credential) → {token, sid}
//!      → Signing          digest = md5_hex(md5_hex(password) + token + api_key)
//!      → CredentialsSubmitted ── user/login {username, password: digest} + sid
//!      → Authenticated | Failed
//! ```
//!
//! The session is written only on the `Authenticated` transition, so a
//! failed attempt never leaves a partial session behind.

use crate::error::ZelloError;
use crate::executor::RequestExecutor;
use crate::signing::RequestSigner;
use crate::types::{Command, Outcome};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const TOKEN_COMMAND: &str = "user/gettoken";
pub const LOGIN_COMMAND: &str = "user/login";
pub const LOGOUT_COMMAND: &str = "user/logout";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    Idle,
    TokenRequested,
    Signing,
    CredentialsSubmitted,
    Authenticated,
    Failed,
}

/// One authentication attempt. Each call to `authenticate` owns its own flow.
pub struct AuthenticationFlow<'a> {
    executor: &'a RequestExecutor,
    signer: &'a RequestSigner,
    state: AuthState,
}

impl<'a> AuthenticationFlow<'a> {
    pub fn new(executor: &'a RequestExecutor, signer: &'a RequestSigner) -> Self {
        Self {
            executor,
            signer,
            state: AuthState::Idle,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    fn transition(&mut self, next: AuthState) {
        debug!("ZelloWork auth {:?} → {:?}", self.state, next);
        self.state = next;
    }

    /// Move to `Failed`, turning a server-reported error into `success=false`.
    fn fail(&mut self, outcome: Outcome, fallback: ZelloError) -> Outcome {
        self.transition(AuthState::Failed);
        if !outcome.success {
            return outcome;
        }
        let error = outcome.error.clone().unwrap_or(fallback);
        warn!("ZelloWork authentication failed: {}", error);
        outcome.into_failed(error)
    }

    pub async fn run(&mut self, username: &str, password: &str) -> Outcome {
        self.transition(AuthState::TokenRequested);
        let token_reply = self
            .executor
            .execute(&Command::get(TOKEN_COMMAND).anonymous())
            .await;
        if !token_reply.is_ok() {
            return self.fail(token_reply, ZelloError::NotAuthenticated);
        }
        let token = match token_reply.get_str("token").filter(|t| !t.is_empty()) {
            Some(token) => token.to_string(),
            None => {
                return self.fail(
                    token_reply,
                    ZelloError::MalformedResponse("token missing from response".to_string()),
                )
            }
        };
        let handshake_sid = token_reply.get_str("sid").map(str::to_string);

        self.transition(AuthState::Signing);
        let digest = self.signer.sign(&token, password);

        self.transition(AuthState::CredentialsSubmitted);
        let login = Command::post(LOGIN_COMMAND)
            .handshake(handshake_sid.clone())
            .form("username", username)
            .form("password", digest);
        let login_reply = self.executor.execute(&login).await;
        if !login_reply.is_ok() {
            return self.fail(login_reply, ZelloError::NotAuthenticated);
        }

        let session_id = login_reply
            .get_str("sid")
            .or_else(|| login_reply.get_str("session_id"))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or(handshake_sid);
        match session_id {
            Some(sid) => {
                self.executor.session().install(&sid, username);
                self.transition(AuthState::Authenticated);
                info!("ZelloWork authenticated as '{}'", username);
                login_reply
            }
            None => self.fail(
                login_reply,
                ZelloError::MalformedResponse("session id missing from login response".to_string()),
            ),
        }
    }
}

/// Log out and drop the local session id, whatever the server says.
pub async fn logout(executor: &RequestExecutor) -> Outcome {
    let outcome = executor.execute(&Command::get(LOGOUT_COMMAND)).await;
    executor.session().clear();
    match &outcome.error {
        None => info!("ZelloWork session closed"),
        Some(err) => warn!("ZelloWork logout reported {}; local session cleared", err),
    }
    outcome
}
