//! Logout Use Case
//!
//! Destroys the session referenced by the cookie token.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Destroy the current session
    ///
    /// A missing or unverifiable token means there is nothing to destroy,
    /// which counts as success.
    pub async fn execute(&self, session_token: Option<&str>) -> AuthResult<()> {
        let Some(session_id) =
            session_token.and_then(|t| SessionToken::verify(t, &self.config.session_secret))
        else {
            return Ok(());
        };

        self.session_repo.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "User logged out");
        Ok(())
    }
}
