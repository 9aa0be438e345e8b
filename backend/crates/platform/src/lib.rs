//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC-SHA256, base64url, random keys)
//! - Password hashing (Argon2id)
//! - Cookie building and parsing

pub mod cookie;
pub mod crypto;
pub mod password;
