//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{session::Session, session::SessionData, user::User};
pub use repository::{SessionRepository, UserRepository};
