//! In-memory Repository Implementation
//!
//! Backs development runs without a database and the HTTP tests.
//! State lives only as long as the process.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// In-memory auth repository
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryAuthRepository {
    /// Number of stored credential records
    pub(crate) async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Number of stored sessions, expired ones included
    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Stored sessions whose payload names `email`
    pub(crate) async fn sessions_for(&self, email: &str) -> Vec<Session> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.user() == Some(email))
            .cloned()
            .collect()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(email.as_str()).cloned())
    }

    async fn create(&self, user: &User) -> AuthResult<bool> {
        let mut users = self.users.write().await;

        if users.contains_key(user.email.as_str()) {
            return Ok(false);
        }

        users.insert(user.email.as_str().to_owned(), user.clone());
        Ok(true)
    }
}

impl SessionRepository for MemoryAuthRepository {
    async fn insert(&self, session: &Session) -> AuthResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        let sessions = self.sessions.read().await;

        Ok(sessions
            .get(&session_id)
            .filter(|s| s.expires_at > Utc::now())
            .cloned())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();

        sessions.retain(|_, s| s.expires_at > now);

        let deleted = (before - sessions.len()) as u64;
        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}
