//! Credentials
//!
//! Handles:
//! - Password hashing and verification (argon2)
//! - Opaque bearer token issuance and resolution

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{generate_token, resolve_token};
