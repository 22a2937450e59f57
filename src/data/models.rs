//! Data models
//!
//! Rust structs representing stored entities and their projections.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// User ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tweet ID wrapper (ULID format)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TweetId(pub String);

impl TweetId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string (e.g. a path parameter)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TweetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TweetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// User
// =============================================================================

/// A stored account
///
/// `password` holds the argon2 PHC string, never the plain password.
/// `token` is the opaque bearer credential issued at signup.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: String,
    pub token: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

/// Minimal public projection of a user, used when expanding references
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub avatar: String,
}

/// Both sides of a user's follow graph
#[derive(Debug, Clone, Default)]
pub struct Connections {
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

// =============================================================================
// Tweet
// =============================================================================

/// A posted tweet with its hashtags and likers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub content: String,
    /// Creation timestamp
    pub date: DateTime<Utc>,
    /// Extracted at creation; order preserved, duplicates allowed
    pub hashtags: Vec<String>,
    /// Liker IDs; never contains duplicates
    pub likes: Vec<UserId>,
    pub author: UserId,
}

impl Tweet {
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        &self.author == user_id
    }
}

/// Row shape of the `tweets` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TweetRow {
    pub id: TweetId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Hashtag usage count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub hashtag: String,
    pub count: u64,
}
