//! Login digest computation for the ZelloWork challenge/response handshake.
//!
//! The server never sees the password or the API key. Instead it issues a
//! one-time `token` and expects
//!
//! ```text
//! md5_hex( md5_hex(password) || token || api_key )
//! ```
//!
//! back in the `password` field of `user/login`. The concatenation order is
//! fixed by the server.

use crate::hasher::{self, Digest};

/// Digest of the raw password, computed once per authentication attempt.
pub fn password_digest(password: &str) -> Digest {
    hasher::digest(password.as_bytes())
}

/// Build the value submitted as `password` in the login command.
pub fn compute_auth_digest(token: &str, api_key: &str, password_digest: &Digest) -> String {
    let mut material = String::with_capacity(32 + token.len() + api_key.len());
    material.push_str(&password_digest.to_hex());
    material.push_str(token);
    material.push_str(api_key);
    hasher::md5_hex(material.as_bytes())
}

/// Signs login attempts with a fixed API key.
#[derive(Clone)]
pub struct RequestSigner {
    api_key: String,
}

impl RequestSigner {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
        }
    }

    /// Digest for `password` answering the server challenge `token`.
    pub fn sign(&self, token: &str, password: &str) -> String {
        compute_auth_digest(token, &self.api_key, &password_digest(password))
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
