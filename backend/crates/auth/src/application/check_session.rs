//! Check Session Use Case
//!
//! Resolves a cookie token into its stored session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthResult;

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Returns the live session for `session_token`, or `None` when the
    /// token is forged, unknown, or expired.
    pub async fn execute(&self, session_token: &str) -> AuthResult<Option<Session>> {
        let Some(session_id) = SessionToken::verify(session_token, &self.config.session_secret)
        else {
            tracing::debug!("Rejected session token with bad signature");
            return Ok(None);
        };

        let Some(session) = self.session_repo.find_by_id(session_id).await? else {
            return Ok(None);
        };

        // Stores filter on expiry already; this covers a clock edge between query and use
        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(session_id).await {
                tracing::warn!(
                    error = %e,
                    session_id = %session_id,
                    "Failed to delete expired session"
                );
            }
            return Ok(None);
        }

        Ok(Some(session))
    }
}
