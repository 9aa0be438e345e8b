//! Form DTOs and plain-text responses

use serde::Deserialize;

/// Body of the login and register forms
///
/// The email travels in the `username` field. No `Debug` so the password
/// never reaches a log line.
#[derive(Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

pub const EMAIL_TAKEN_MESSAGE: &str = "Email already exists. Try logging in.";
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";
pub const INCORRECT_PASSWORD_MESSAGE: &str = "Incorrect Password";
