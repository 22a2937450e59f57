//! Request and response DTOs
//!
//! Every response body is `{ "result": true, ...payload }`; errors use the
//! `{ "result": false, "error": ... }` shape produced by `AppError`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Trend, Tweet, TweetId, UserId};
use crate::service::Profile;

// =============================================================================
// Requests
// =============================================================================

/// Absent fields are treated as empty so the service reports them uniformly.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SigninRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub token: Option<String>,
    pub target_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTweetRequest {
    pub content: Option<String>,
    pub token: Option<String>,
}

/// Body of the token-only endpoints (delete, like)
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub result: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            result: true,
            payload,
        }
    }
}

/// Payload-less success
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Returned by signup and signin
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: UserId,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub following: bool,
}

/// User as listed in a connections response
#[derive(Debug, Serialize)]
pub struct ConnectionUser {
    pub username: String,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    pub followers: Vec<ConnectionUser>,
    pub following: Vec<ConnectionUser>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Profile,
}

#[derive(Debug, Serialize)]
pub struct CreatedTweetResponse {
    pub tweet: Tweet,
}

/// Tweet author; which optional fields are present depends on the listing
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikerResponse {
    pub id: UserId,
    pub username: String,
}

/// Tweet with author and likers expanded
#[derive(Debug, Serialize)]
pub struct TweetResponse {
    pub id: TweetId,
    pub content: String,
    pub date: DateTime<Utc>,
    pub hashtags: Vec<String>,
    pub likes: Vec<LikerResponse>,
    pub author: Option<AuthorResponse>,
}

#[derive(Debug, Serialize)]
pub struct TweetsResponse {
    pub tweets: Vec<TweetResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikedResponse {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<Trend>,
}
