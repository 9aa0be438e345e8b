//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure layer.

use crate::domain::entity::{session::Session, user::User};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;
use uuid::Uuid;

/// Credential store
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Find user by exact email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Insert a new user
    ///
    /// Returns `false` without error when the email is already taken, which
    /// covers two registrations racing past the existence check.
    async fn create(&self, user: &User) -> AuthResult<bool>;
}

/// Session store
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Insert a session, replacing any session with the same id
    async fn insert(&self, session: &Session) -> AuthResult<()>;

    /// Find an unexpired session by ID
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>>;

    /// Delete a session (no-op if absent)
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Delete every expired session, returning how many were removed
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
