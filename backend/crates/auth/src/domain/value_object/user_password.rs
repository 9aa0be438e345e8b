//! User Password Value Objects
//!
//! Domain wrappers over `platform::password`. Hashing and verification are
//! CPU-bound Argon2id work and run on tokio's blocking pool, so each is a
//! single `.await` for the caller.

use platform::password::{ClearTextPassword, HashedPassword};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Raw password from the form (zeroized on drop)
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    pub fn new(raw: String) -> Self {
        Self(ClearTextPassword::new(raw))
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stored password hash (PHC string)
///
/// Kept as the raw column value; it is parsed on verification so that a
/// corrupt row surfaces as a verification error rather than a lookup error.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(String);

impl UserPassword {
    /// Hash a raw password for storage
    pub async fn from_raw(raw: RawPassword) -> AuthResult<Self> {
        let hashed = tokio::task::spawn_blocking(move || raw.0.hash())
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))??;

        Ok(Self(hashed.as_phc_string().to_owned()))
    }

    /// Verify a raw password against this hash
    pub async fn verify(&self, raw: RawPassword) -> AuthResult<bool> {
        let phc = self.0.clone();

        let matched = tokio::task::spawn_blocking(move || {
            HashedPassword::from_phc_string(phc)?.verify(&raw.0)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))??;

        Ok(matched)
    }

    /// Create from database value
    pub fn from_db(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
