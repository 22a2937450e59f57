//! Tweet service
//!
//! Posting, listing, deleting and liking tweets, plus hashtag queries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use super::hashtag::{extract_hashtags, rank_hashtags};
use crate::auth::resolve_token;
use crate::data::{Database, Trend, Tweet, TweetId, UserId, UserSummary};
use crate::error::AppError;
use crate::metrics::TWEETS_POSTED_TOTAL;

/// A tweet with its author and likers resolved to user summaries
#[derive(Debug, Clone)]
pub struct ExpandedTweet {
    pub tweet: Tweet,
    /// `None` only if the author row has disappeared
    pub author: Option<UserSummary>,
    /// Likers in like order; unknown IDs are skipped
    pub likers: Vec<UserSummary>,
}

/// Tweet service
pub struct TweetService {
    db: Arc<Database>,
}

impl TweetService {
    /// Create new tweet service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Post a tweet as the token's owner
    ///
    /// Hashtags are extracted from `content` once, here.
    ///
    /// # Errors
    /// - `AppError::Validation` if content or token is empty
    /// - `AppError::Unauthorized` if the token is unknown
    pub async fn create(&self, content: &str, token: &str) -> Result<Tweet, AppError> {
        if content.is_empty() || token.is_empty() {
            return Err(AppError::Validation("Missing content or token".to_string()));
        }

        let author = resolve_token(&self.db, Some(token)).await?;

        let tweet = Tweet {
            id: TweetId::new(),
            content: content.to_string(),
            date: Utc::now(),
            hashtags: extract_hashtags(content),
            likes: vec![],
            author: author.id,
        };

        self.db.insert_tweet(&tweet).await?;
        TWEETS_POSTED_TOTAL.inc();
        tracing::info!(
            tweet_id = %tweet.id,
            author_id = %tweet.author,
            hashtags = tweet.hashtags.len(),
            "Tweet posted"
        );

        Ok(tweet)
    }

    /// All tweets, newest first
    pub async fn list(&self) -> Result<Vec<ExpandedTweet>, AppError> {
        let tweets = self.db.list_tweets().await?;
        self.expand(tweets).await
    }

    /// Delete a tweet owned by the token's owner
    ///
    /// # Errors
    /// - `AppError::Unauthorized` if the token is missing or unknown
    /// - `AppError::NotFound` if the tweet does not exist
    /// - `AppError::Forbidden` if the caller is not the author
    pub async fn delete(&self, id: &TweetId, token: Option<&str>) -> Result<(), AppError> {
        let user = resolve_token(&self.db, token).await?;
        let tweet = self
            .db
            .get_tweet(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tweet not found".to_string()))?;

        if !tweet.is_authored_by(&user.id) {
            return Err(AppError::Forbidden("Unauthorized".to_string()));
        }

        self.db.delete_tweet(id).await?;
        tracing::info!(tweet_id = %id, author_id = %user.id, "Tweet deleted");

        Ok(())
    }

    /// Like a tweet, or unlike it if already liked
    ///
    /// # Returns
    /// `true` if the caller likes the tweet afterwards
    pub async fn toggle_like(&self, id: &TweetId, token: Option<&str>) -> Result<bool, AppError> {
        let user = resolve_token(&self.db, token).await?;
        let liked = self.db.toggle_like(id, &user.id).await?;
        tracing::debug!(tweet_id = %id, user_id = %user.id, liked, "Like toggled");

        Ok(liked)
    }

    /// Tweets tagged `#name`, newest first
    pub async fn by_hashtag(&self, name: &str) -> Result<Vec<ExpandedTweet>, AppError> {
        let tag = format!("#{}", name);
        let tweets = self.db.list_tweets_by_hashtag(&tag).await?;
        self.expand(tweets).await
    }

    /// Every hashtag ranked by number of occurrences
    pub async fn trends(&self) -> Result<Vec<Trend>, AppError> {
        let tags = self.db.get_all_hashtags().await?;
        Ok(rank_hashtags(tags))
    }

    /// Tweets written by `username`, newest first
    ///
    /// # Errors
    /// `AppError::NotFound` if the user does not exist
    pub async fn by_user(&self, username: &str) -> Result<Vec<ExpandedTweet>, AppError> {
        let user = self
            .db
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let tweets = self.db.list_tweets_by_author(&user.id).await?;
        self.expand(tweets).await
    }

    /// Resolve authors and likers with one lookup per batch
    async fn expand(&self, tweets: Vec<Tweet>) -> Result<Vec<ExpandedTweet>, AppError> {
        let mut ids: Vec<UserId> = tweets
            .iter()
            .flat_map(|tweet| std::iter::once(&tweet.author).chain(tweet.likes.iter()))
            .cloned()
            .collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();

        let users: HashMap<UserId, UserSummary> = self.db.get_user_summaries(&ids).await?;

        Ok(tweets
            .into_iter()
            .map(|tweet| ExpandedTweet {
                author: users.get(&tweet.author).cloned(),
                likers: tweet
                    .likes
                    .iter()
                    .filter_map(|id| users.get(id).cloned())
                    .collect(),
                tweet,
            })
            .collect())
    }
}
