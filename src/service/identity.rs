//! Identity service
//!
//! Accounts, credentials and the follow graph.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::auth::{generate_token, hash_password, verify_password};
use crate::data::{Connections, Database, User, UserId};
use crate::error::AppError;
use crate::metrics::SIGNUPS_TOTAL;

/// Names taken by fixed `/users/...` routes; a profile under them would be unreachable.
const RESERVED_USERNAMES: &[&str] = &["signup", "signin", "follow", "connections"];

/// A stored account together with both sides of its follow graph
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub followers: Vec<UserId>,
    pub following: Vec<UserId>,
}

/// Identity service
pub struct IdentityService {
    db: Arc<Database>,
    default_avatar: String,
}

impl IdentityService {
    /// Create new identity service
    pub fn new(db: Arc<Database>, default_avatar: impl Into<String>) -> Self {
        Self {
            db,
            default_avatar: default_avatar.into(),
        }
    }

    /// Create an account
    ///
    /// # Errors
    /// - `AppError::Validation` if any field is empty
    /// - `AppError::Conflict` if the username is taken or reserved
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<User, AppError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Missing fields".to_string()));
        }

        if RESERVED_USERNAMES.contains(&username) {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        // Fast-path guard before hashing; the unique index closes the race.
        if self.db.get_user_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(AppError::Internal)?;

        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash,
            token: generate_token(),
            avatar: self.default_avatar.clone(),
            created_at: Utc::now(),
        };

        self.db.insert_user(&user).await?;
        SIGNUPS_TOTAL.inc();
        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        Ok(user)
    }

    /// Verify credentials and return the account
    ///
    /// # Errors
    /// - `AppError::NotFound` if no such username exists
    /// - `AppError::Unauthorized` if the password does not match
    pub async fn signin(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .db
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let password = password.to_string();
        let stored_hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        if !matches {
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        tracing::debug!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    /// Follow `target_token`'s owner, or unfollow if already following
    ///
    /// # Returns
    /// `true` if the caller follows the target afterwards
    ///
    /// # Errors
    /// - `AppError::NotFound` if either token is missing or unknown
    /// - `AppError::Validation` if both tokens belong to the same user
    pub async fn toggle_follow(&self, token: &str, target_token: &str) -> Result<bool, AppError> {
        let follower = self.user_for_token(token).await?;
        let target = self.user_for_token(target_token).await?;

        if follower.id == target.id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        let following = self.db.toggle_follow(&follower.id, &target.id).await?;
        tracing::info!(
            follower_id = %follower.id,
            following_id = %target.id,
            following,
            "Follow toggled"
        );

        Ok(following)
    }

    /// Followers and following of the token's owner
    pub async fn get_connections(&self, token: &str) -> Result<Connections, AppError> {
        let user = self.user_for_token(token).await?;
        self.db.get_connections(&user.id).await
    }

    /// Full stored record for `username` plus its follow graph
    pub async fn get_profile(&self, username: &str) -> Result<Profile, AppError> {
        let user = self
            .db
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let followers = self.db.get_follower_ids(&user.id).await?;
        let following = self.db.get_following_ids(&user.id).await?;

        Ok(Profile {
            user,
            followers,
            following,
        })
    }

    async fn user_for_token(&self, token: &str) -> Result<User, AppError> {
        if token.is_empty() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.db
            .get_user_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_service() -> (IdentityService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", temp_dir.path().join("test.db").display());
        let db = Database::connect(&url, 5).await.unwrap();
        let service = IdentityService::new(Arc::new(db), "https://example.com/egg.png");
        (service, temp_dir)
    }

    #[tokio::test]
    async fn signup_then_signin_returns_same_token() {
        let (service, _temp_dir) = create_service().await;

        let created = service.signup("alice", "a@example.com", "pw").await.unwrap();
        assert_ne!(created.password, "pw");
        assert_eq!(created.avatar, "https://example.com/egg.png");

        let signed_in = service.signin("alice", "pw").await.unwrap();
        assert_eq!(signed_in.token, created.token);
        assert_eq!(signed_in.id, created.id);
    }

    #[tokio::test]
    async fn signup_requires_every_field() {
        let (service, _temp_dir) = create_service().await;

        for (username, email, password) in [("", "e", "p"), ("u", "", "p"), ("u", "e", "")] {
            let error = service.signup(username, email, password).await.unwrap_err();
            assert!(matches!(error, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn signup_with_taken_username_conflicts() {
        let (service, _temp_dir) = create_service().await;
        service.signup("alice", "a@example.com", "pw").await.unwrap();

        let error = service
            .signup("alice", "other@example.com", "different")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn route_names_cannot_be_registered() {
        let (service, _temp_dir) = create_service().await;

        for username in ["signup", "signin", "follow", "connections"] {
            let error = service
                .signup(username, "x@example.com", "pw")
                .await
                .unwrap_err();
            assert!(matches!(error, AppError::Conflict(_)), "{username} was accepted");
        }

        // Matching is exact; similar names are fine.
        service.signup("Signup", "x@example.com", "pw").await.unwrap();
        service.signup("follower", "y@example.com", "pw").await.unwrap();
    }

    #[tokio::test]
    async fn signin_failures() {
        let (service, _temp_dir) = create_service().await;
        service.signup("alice", "a@example.com", "pw").await.unwrap();

        let error = service.signin("bob", "pw").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));

        let error = service.signin("alice", "wrong").await.unwrap_err();
        assert!(matches!(error, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn toggle_follow_is_its_own_inverse() {
        let (service, _temp_dir) = create_service().await;
        let alice = service.signup("alice", "a@example.com", "pw").await.unwrap();
        let bob = service.signup("bob", "b@example.com", "pw").await.unwrap();

        assert!(service.toggle_follow(&alice.token, &bob.token).await.unwrap());

        let alice_profile = service.get_profile("alice").await.unwrap();
        let bob_profile = service.get_profile("bob").await.unwrap();
        assert_eq!(alice_profile.following, vec![bob.id.clone()]);
        assert_eq!(bob_profile.followers, vec![alice.id.clone()]);

        assert!(!service.toggle_follow(&alice.token, &bob.token).await.unwrap());

        let alice_profile = service.get_profile("alice").await.unwrap();
        let bob_profile = service.get_profile("bob").await.unwrap();
        assert!(alice_profile.following.is_empty());
        assert!(bob_profile.followers.is_empty());
    }

    #[tokio::test]
    async fn toggle_follow_rejects_self_and_unknown_tokens() {
        let (service, _temp_dir) = create_service().await;
        let alice = service.signup("alice", "a@example.com", "pw").await.unwrap();

        let error = service
            .toggle_follow(&alice.token, &alice.token)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));

        let error = service.toggle_follow(&alice.token, "nope").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));

        let error = service.toggle_follow("", &alice.token).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn connections_list_both_sides() {
        let (service, _temp_dir) = create_service().await;
        let alice = service.signup("alice", "a@example.com", "pw").await.unwrap();
        let bob = service.signup("bob", "b@example.com", "pw").await.unwrap();
        service.toggle_follow(&bob.token, &alice.token).await.unwrap();

        let connections = service.get_connections(&alice.token).await.unwrap();
        assert_eq!(connections.followers.len(), 1);
        assert_eq!(connections.followers[0].username, "bob");
        assert!(connections.following.is_empty());

        let error = service.get_connections("nope").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let (service, _temp_dir) = create_service().await;
        let error = service.get_profile("ghost").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));
    }
}
