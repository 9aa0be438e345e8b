//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases (register, login, logout, session check)
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, pages, middleware, router
//!
//! ## Features
//! - Registration and login with email + password
//! - Server-side sessions referenced by a signed cookie token
//! - A gated page that redirects anonymous visitors to the login form
//!
//! ## Security Model
//! - Passwords hashed with Argon2id; cleartext is zeroized after use
//! - Session tokens are `uuid.HMAC-SHA256(uuid)`; forged tokens count as no session
//! - Session ids are rotated on every login and registration
//! - Responses are marked `no-store`

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::repository::{SessionRepository, UserRepository};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryAuthRepository, postgres::PgAuthRepository};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
