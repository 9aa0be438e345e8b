//! Login Use Case
//!
//! Verifies credentials and establishes an authenticated session.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::application::session::establish;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, session_token::SessionToken, user_password::RawPassword,
};
use crate::error::AuthResult;

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Session id the request already carried, destroyed on success
    pub previous_session: Option<Uuid>,
}

/// Login outcome
///
/// Rejections leave session state untouched.
#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn { session_token: SessionToken },
    UserNotFound,
    IncorrectPassword,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutcome> {
        let email = Email::new(input.email)?;

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            tracing::debug!(email = %email, "Login for unknown email");
            return Ok(LoginOutcome::UserNotFound);
        };

        if !user
            .password_hash
            .verify(RawPassword::new(input.password))
            .await?
        {
            tracing::warn!(email = %user.email, "Incorrect password");
            return Ok(LoginOutcome::IncorrectPassword);
        }

        let session_token = establish(
            self.session_repo.as_ref(),
            &self.config,
            &user.email,
            input.previous_session,
        )
        .await?;

        tracing::info!(email = %user.email, "User logged in");

        Ok(LoginOutcome::LoggedIn { session_token })
    }
}
