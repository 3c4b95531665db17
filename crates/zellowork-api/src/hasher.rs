//! MD5 digests, the one-way function the ZelloWork server uses for login.

use md5::{Digest as _, Md5};
use std::fmt;

/// A 16-byte MD5 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 16]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lower-case, zero-padded 32-character hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the MD5 digest of `data`.
pub fn digest(data: &[u8]) -> Digest {
    let out = Md5::digest(data);
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&out);
    Digest(bytes)
}

/// Compute the MD5 digest of `data` and return it hex-encoded.
pub fn md5_hex(data: &[u8]) -> String {
    digest(data).to_hex()
}
