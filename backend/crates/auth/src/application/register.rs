//! Register Use Case
//!
//! Creates a new credential record and an authenticated session.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::application::session::establish;
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    session_token::SessionToken,
    user_password::{RawPassword, UserPassword},
};
use crate::error::AuthResult;

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    /// Session id the request already carried, destroyed on success
    pub previous_session: Option<Uuid>,
}

/// Register outcome
#[derive(Debug)]
pub enum RegisterOutcome {
    Registered { session_token: SessionToken },
    EmailTaken,
}

/// Register use case
pub struct RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> RegisterUseCase<U, S>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutcome> {
        let email = Email::new(input.email)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "Registration for existing email");
            return Ok(RegisterOutcome::EmailTaken);
        }

        let password_hash = UserPassword::from_raw(RawPassword::new(input.password)).await?;
        let user = User::new(email, password_hash);

        // A concurrent registration may have won since the lookup
        if !self.user_repo.create(&user).await? {
            tracing::debug!(email = %user.email, "Registration lost race for email");
            return Ok(RegisterOutcome::EmailTaken);
        }

        let session_token = establish(
            self.session_repo.as_ref(),
            &self.config,
            &user.email,
            input.previous_session,
        )
        .await?;

        tracing::info!(email = %user.email, "User registered");

        Ok(RegisterOutcome::Registered { session_token })
    }
}
