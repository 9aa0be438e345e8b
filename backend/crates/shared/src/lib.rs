//! Shared Kernel
//!
//! The error vocabulary shared by every crate in the workspace:
//! - [`error::kind::ErrorKind`] classification mapped to HTTP status codes
//! - [`error::app_error::AppError`] and the [`error::app_error::AppResult`] alias
//! - Conversions from database and framework errors (feature-gated)

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
