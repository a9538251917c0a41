//! Bearer token check for the command endpoint.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// SHA-256 digest of the configured command token.
///
/// Presented tokens are hashed and compared digest to digest, so the
/// comparison length never depends on the secret.
#[derive(Clone)]
pub struct CommandToken {
    digest: [u8; 32],
}

impl CommandToken {
    /// Hashes the configured token.
    #[must_use]
    pub fn new(token: &SecretString) -> Self {
        Self {
            digest: Sha256::digest(token.expose_secret().as_bytes()).into(),
        }
    }

    /// Checks an `Authorization` header value of the form `Bearer <token>`.
    #[must_use]
    pub fn verify(&self, header: Option<&str>) -> bool {
        let Some(presented) = header.and_then(|value| value.strip_prefix("Bearer ")) else {
            return false;
        };
        let candidate: [u8; 32] = Sha256::digest(presented.trim().as_bytes()).into();
        constant_time_eq(&candidate, &self.digest)
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |diff, (lhs, rhs)| diff | (lhs ^ rhs))
        == 0
}
