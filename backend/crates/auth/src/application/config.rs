//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::crypto::{random_key, sha256};

use crate::error::{AuthError, AuthResult};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Key for signing session tokens (HMAC-SHA256)
    pub session_secret: [u8; 32],
    /// Session lifetime, also the cookie Max-Age (24 hours)
    pub session_ttl: Duration,
    /// Whether to mark the cookie Secure
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "secrets.sid".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(24 * 3600),
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl AuthConfig {
    /// Derive the signing key from an arbitrary secret phrase
    pub fn from_secret_phrase(phrase: &str) -> Self {
        Self {
            session_secret: sha256(phrase.as_bytes()),
            ..Default::default()
        }
    }

    /// Create config with a random session secret
    ///
    /// Sessions do not survive a restart with this secret.
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: random_key(),
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Session TTL as a chrono duration for expiry arithmetic
    pub fn session_ttl_delta(&self) -> AuthResult<chrono::Duration> {
        chrono::Duration::from_std(self.session_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))
    }

    /// Cookie attributes for the session cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs()),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl", &self.session_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .finish()
    }
}
