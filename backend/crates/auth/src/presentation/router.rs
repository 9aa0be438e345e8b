//! Auth Router

use axum::{
    Router,
    http::{HeaderValue, header},
    middleware,
    routing::get,
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{load_session, require_user};

/// Route paths
pub mod paths {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const SECRETS: &str = "/secrets";
    pub const LOGOUT: &str = "/logout";
}

/// Sent on every response so the gated page never comes back from history
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate, private";

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    let protected: Router<AuthAppState<R>> = Router::new()
        .route(paths::SECRETS, get(handlers::secrets))
        .route_layer(middleware::from_fn(require_user));

    Router::new()
        .route(paths::HOME, get(handlers::home))
        .route(
            paths::LOGIN,
            get(handlers::login_page).post(handlers::login::<R>),
        )
        .route(
            paths::REGISTER,
            get(handlers::register_page).post(handlers::register::<R>),
        )
        .route(paths::LOGOUT, get(handlers::logout::<R>))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_session::<R>,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_STORE),
        ))
        .with_state(state)
}
