//! Session establishment shared by registration and login

use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::{email::Email, session_token::SessionToken};
use crate::error::AuthResult;

/// Create a fresh session for `email` and return its signed token
///
/// A session the request already carried is destroyed so that an id known
/// before authentication is never promoted to an authenticated one.
pub(crate) async fn establish<S>(
    session_repo: &S,
    config: &AuthConfig,
    email: &Email,
    previous_session: Option<Uuid>,
) -> AuthResult<SessionToken>
where
    S: SessionRepository,
{
    let session = Session::for_user(email, config.session_ttl_delta()?);
    session_repo.insert(&session).await?;

    if let Some(previous) = previous_session {
        if let Err(e) = session_repo.delete(previous).await {
            tracing::warn!(
                error = %e,
                session_id = %previous,
                "Failed to destroy previous session"
            );
        }
    }

    Ok(SessionToken::issue(session.session_id, &config.session_secret))
}
