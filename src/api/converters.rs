//! Conversion functions from service results to API DTOs

use crate::api::dto::*;
use crate::data::{User, UserSummary};
use crate::service::ExpandedTweet;

/// Which author fields a tweet listing exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorFields {
    /// `{ username, email }` (global and hashtag listings)
    Email,
    /// `{ username, avatar }` (per-user listing)
    Avatar,
}

/// Convert a signed-up or signed-in user to AuthResponse
pub fn user_to_auth_response(user: User) -> AuthResponse {
    AuthResponse {
        token: user.token,
        username: user.username,
        email: user.email,
        user_id: user.id,
        avatar: user.avatar,
    }
}

pub fn summary_to_connection(summary: UserSummary) -> ConnectionUser {
    ConnectionUser {
        username: summary.username,
        avatar: summary.avatar,
    }
}

/// Convert an expanded tweet to TweetResponse
pub fn tweet_to_response(expanded: ExpandedTweet, fields: AuthorFields) -> TweetResponse {
    let ExpandedTweet {
        tweet,
        author,
        likers,
    } = expanded;

    TweetResponse {
        id: tweet.id,
        content: tweet.content,
        date: tweet.date,
        hashtags: tweet.hashtags,
        likes: likers
            .into_iter()
            .map(|liker| LikerResponse {
                id: liker.id,
                username: liker.username,
            })
            .collect(),
        author: author.map(|author| AuthorResponse {
            id: author.id,
            username: author.username,
            email: (fields == AuthorFields::Email).then_some(author.email),
            avatar: (fields == AuthorFields::Avatar).then_some(author.avatar),
        }),
    }
}

pub fn tweets_to_response(tweets: Vec<ExpandedTweet>, fields: AuthorFields) -> Vec<TweetResponse> {
    tweets
        .into_iter()
        .map(|tweet| tweet_to_response(tweet, fields))
        .collect()
}
