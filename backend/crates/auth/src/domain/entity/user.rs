//! User Entity
//!
//! A row of the credential store: the email and its password hash.

use crate::domain::value_object::{email::Email, user_password::UserPassword};

/// User entity
///
/// Created on registration; never updated or deleted.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique account identifier
    pub email: Email,
    /// Argon2id PHC string, never the raw password
    pub password_hash: UserPassword,
}

impl User {
    pub fn new(email: Email, password_hash: UserPassword) -> Self {
        Self {
            email,
            password_hash,
        }
    }
}
