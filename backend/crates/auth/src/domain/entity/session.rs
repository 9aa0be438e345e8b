//! Session Entity
//!
//! Server-side session record referenced by the signed cookie token.
//! The payload is stored as JSON so it can grow without schema changes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::email::Email;

/// Session payload
///
/// `user` is the only authorization signal for the gated page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl SessionData {
    pub fn for_user(email: &Email) -> Self {
        Self {
            user: Some(email.as_str().to_owned()),
        }
    }
}

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID v4), the id half of the cookie token
    pub session_id: Uuid,
    pub data: SessionData,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for an authenticated user
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn for_user(email: &Email, ttl: Duration) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            data: SessionData::for_user(email),
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Authenticated email, if any
    pub fn user(&self) -> Option<&str> {
        self.data.user.as_deref()
    }
}
