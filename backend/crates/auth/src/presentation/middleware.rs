//! Session Middleware
//!
//! `load_session` resolves the cookie into a session for every request and
//! `require_user` gates protected routes on it.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

use crate::application::CheckSessionUseCase;
use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::handlers::AuthAppState;
use crate::presentation::router::paths;

/// Session attached to the request by `load_session`
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn session_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|s| s.session_id)
    }

    /// Authenticated email, if any
    pub fn user(&self) -> Option<&str> {
        self.0.as_ref().and_then(Session::user)
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Resolve the session cookie and attach the result to the request
///
/// Forged, unknown and expired tokens all yield an empty session. Store
/// failures end the request with a 500.
pub async fn load_session<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let token =
        platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);

    let session = match token {
        Some(token) => {
            let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
            match use_case.execute(&token).await {
                Ok(session) => session,
                Err(e) => return e.into_response(),
            }
        }
        None => None,
    };

    req.extensions_mut().insert(CurrentSession(session));

    next.run(req).await
}

/// Guard predicate: the session names a user
pub fn is_authenticated(current: &CurrentSession) -> bool {
    current.user().is_some()
}

/// Redirect to the login page unless the request is authenticated
pub async fn require_user(current: CurrentSession, req: Request<Body>, next: Next) -> Response {
    if !is_authenticated(&current) {
        return Redirect::to(paths::LOGIN).into_response();
    }

    next.run(req).await
}
