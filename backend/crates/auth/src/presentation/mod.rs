//! Presentation Layer
//!
//! HTTP handlers, forms, pages, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{CurrentSession, is_authenticated, load_session, require_user};
pub use router::{auth_router, auth_router_generic};
