//! Session Token Value Object
//!
//! The cookie value: `<session-uuid>.<base64url(HMAC-SHA256(secret, session-uuid))>`.
//! The signature lets the server reject forged or truncated ids without a
//! database round-trip.

use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};
use std::fmt;
use uuid::Uuid;

/// Signed session token
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Sign a session id
    pub fn issue(session_id: Uuid, secret: &[u8; 32]) -> Self {
        let session_id = session_id.to_string();
        let signature = hmac_sha256(secret, session_id.as_bytes());

        Self(format!("{}.{}", session_id, to_base64url(&signature)))
    }

    /// Verify a cookie value and return the session id it names
    ///
    /// `None` for anything malformed or signed with another secret.
    pub fn verify(token: &str, secret: &[u8; 32]) -> Option<Uuid> {
        let (session_id, signature_b64) = token.split_once('.')?;
        let signature = from_base64url(signature_b64).ok()?;

        if !verify_hmac_sha256(secret, session_id.as_bytes(), &signature) {
            return None;
        }

        session_id.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}
