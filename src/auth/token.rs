//! Opaque bearer tokens
//!
//! Tokens are issued once at signup and never expire. They carry no
//! information; every request resolves them against the user store.

use base64::Engine;
use rand::RngCore;

use crate::data::{Database, User};
use crate::error::AppError;

const TOKEN_BYTES: usize = 32;

/// Generate a new random token (URL-safe base64, no padding)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Resolve a caller-supplied token to its user
///
/// # Errors
/// `AppError::Unauthorized` if the token is missing, empty or unknown
pub async fn resolve_token(db: &Database, token: Option<&str>) -> Result<User, AppError> {
    let token = token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    db.get_user_by_token(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn token_is_url_safe_and_unpadded() {
        let token = generate_token();
        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..64).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 64);
    }
}
