//! HTTP Handlers

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginOutcome, LoginUseCase, LogoutUseCase, RegisterInput, RegisterOutcome,
    RegisterUseCase,
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CredentialsForm, EMAIL_TAKEN_MESSAGE, INCORRECT_PASSWORD_MESSAGE, USER_NOT_FOUND_MESSAGE,
};
use crate::presentation::middleware::CurrentSession;
use crate::presentation::pages;
use crate::presentation::router::paths;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Pages
// ============================================================================

/// GET /
pub async fn home() -> Html<&'static str> {
    Html(pages::HOME_PAGE)
}

/// GET /login
pub async fn login_page() -> Html<&'static str> {
    Html(pages::LOGIN_PAGE)
}

/// GET /register
pub async fn register_page() -> Html<&'static str> {
    Html(pages::REGISTER_PAGE)
}

/// GET /secrets (behind `require_user`)
pub async fn secrets() -> Html<&'static str> {
    Html(pages::SECRETS_PAGE)
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentSession,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let Form(form) = form.map_err(|e| AuthError::InvalidInput(e.body_text()))?;

    let use_case = RegisterUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        email: form.username,
        password: form.password,
        previous_session: current.session_id(),
    };

    match use_case.execute(input).await? {
        RegisterOutcome::Registered { session_token } => {
            session_redirect(&state.config, &session_token)
        }
        RegisterOutcome::EmailTaken => Ok((StatusCode::OK, EMAIL_TAKEN_MESSAGE).into_response()),
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentSession,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let Form(form) = form.map_err(|e| AuthError::InvalidInput(e.body_text()))?;

    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let input = LoginInput {
        email: form.username,
        password: form.password,
        previous_session: current.session_id(),
    };

    match use_case.execute(input).await? {
        LoginOutcome::LoggedIn { session_token } => {
            session_redirect(&state.config, &session_token)
        }
        LoginOutcome::UserNotFound => Ok((StatusCode::OK, USER_NOT_FOUND_MESSAGE).into_response()),
        LoginOutcome::IncorrectPassword => {
            Ok((StatusCode::OK, INCORRECT_PASSWORD_MESSAGE).into_response())
        }
    }
}

// ============================================================================
// Logout
// ============================================================================

/// GET /logout
///
/// If the session cannot be destroyed the cookie is kept and the visitor is
/// sent back to the gated page.
pub async fn logout<R>(State(state): State<AuthAppState<R>>, headers: HeaderMap) -> Response
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(&headers, &state.config.session_cookie_name);

    let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());

    if let Err(e) = use_case.execute(token.as_deref()).await {
        e.log();
        return Redirect::to(paths::SECRETS).into_response();
    }

    match state.config.cookie_config().delete_cookie_header() {
        Ok(cookie) => ([(header::SET_COOKIE, cookie)], Redirect::to(paths::HOME)).into_response(),
        Err(e) => AuthError::Internal(format!("Invalid cookie header: {e}")).into_response(),
    }
}

// ============================================================================
// Cookie Helpers
// ============================================================================

/// Set the session cookie and redirect to the gated page
fn session_redirect(config: &AuthConfig, session_token: &SessionToken) -> AuthResult<Response> {
    let cookie = session_cookie(config, session_token)?;

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(paths::SECRETS)).into_response())
}

fn session_cookie(config: &AuthConfig, session_token: &SessionToken) -> AuthResult<HeaderValue> {
    config
        .cookie_config()
        .set_cookie_header(session_token.as_str())
        .map_err(|e| AuthError::Internal(format!("Invalid cookie header: {e}")))
}
