//! SQLite database operations
//!
//! All database access goes through this module.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use super::models::*;
use crate::error::AppError;
use crate::metrics::observe_db_query;

/// SQLite caps bound parameters per statement; IN lists are chunked below it.
const IN_CLAUSE_CHUNK: usize = 100;

const TWEET_COLUMNS: &str = "t.id, t.author_id, t.content, t.created_at";

/// File path behind a `sqlite:` connection string, if it names a file.
fn database_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to the database named by `url`
    ///
    /// Creates the database file (and its directory) if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `url` - Connection string, e.g. `sqlite://data/hackatweet.db?mode=rwc`
    /// * `max_connections` - Pool size
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        if let Some(parent) = database_file_path(url)
            .as_deref()
            .and_then(|path| path.parent())
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user
    ///
    /// # Errors
    /// `AppError::Conflict` if the username (or token) is already taken
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        observe_db_query("INSERT", "users");
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password, token, avatar, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.token)
        .bind(&user.avatar)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => {
                Err(AppError::Conflict("Username already taken".to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Get user by username (exact match)
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        observe_db_query("SELECT", "users");
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by bearer token (exact match)
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        observe_db_query("SELECT", "users");
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Resolve user IDs to their public projections
    ///
    /// Unknown IDs are simply absent from the returned map.
    pub async fn get_user_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, UserSummary>, AppError> {
        let mut summaries = HashMap::with_capacity(ids.len());
        if ids.is_empty() {
            return Ok(summaries);
        }

        observe_db_query("SELECT", "users");
        for chunk in ids.chunks(IN_CLAUSE_CHUNK) {
            let mut query_builder = QueryBuilder::<Sqlite>::new(
                "SELECT id, username, email, avatar FROM users WHERE id IN (",
            );
            {
                let mut separated = query_builder.separated(", ");
                for id in chunk {
                    separated.push_bind(id.as_str());
                }
            }
            query_builder.push(")");

            let rows = query_builder
                .build_query_as::<UserSummary>()
                .fetch_all(&self.pool)
                .await?;
            summaries.extend(rows.into_iter().map(|summary| (summary.id.clone(), summary)));
        }

        Ok(summaries)
    }

    // =========================================================================
    // Follow graph
    // =========================================================================

    /// Flip the follow edge `follower -> following`
    ///
    /// Runs as one transaction: the edge is deleted if present, inserted
    /// otherwise. The DELETE takes SQLite's write lock, so concurrent
    /// toggles serialize. Both sides of the relationship live in the same
    /// row, so followers and following always stay mutual.
    ///
    /// Dropping the future before commit rolls the transaction back.
    ///
    /// # Returns
    /// `true` if `follower` follows `following` afterwards
    pub async fn toggle_follow(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<bool, AppError> {
        observe_db_query("TOGGLE", "follows");
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower)
            .bind(following)
            .execute(&mut *tx)
            .await?;

        let following_now = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(
                "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(follower)
            .bind(following)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
            true
        };

        tx.commit().await?;
        Ok(following_now)
    }

    /// IDs of users following `user_id`, oldest edge first
    pub async fn get_follower_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, AppError> {
        observe_db_query("SELECT", "follows");
        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT follower_id FROM follows WHERE following_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// IDs of users `user_id` follows, oldest edge first
    pub async fn get_following_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, AppError> {
        observe_db_query("SELECT", "follows");
        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT following_id FROM follows WHERE follower_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Followers and following of a user, expanded to summaries
    pub async fn get_connections(&self, user_id: &UserId) -> Result<Connections, AppError> {
        observe_db_query("SELECT", "follows");
        let followers = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.email, u.avatar
            FROM follows f
            INNER JOIN users u ON u.id = f.follower_id
            WHERE f.following_id = ?
            ORDER BY f.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let following = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.email, u.avatar
            FROM follows f
            INNER JOIN users u ON u.id = f.following_id
            WHERE f.follower_id = ?
            ORDER BY f.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Connections {
            followers,
            following,
        })
    }

    // =========================================================================
    // Tweets
    // =========================================================================

    /// Insert a tweet together with its hashtags and likes atomically
    pub async fn insert_tweet(&self, tweet: &Tweet) -> Result<(), AppError> {
        observe_db_query("INSERT", "tweets");
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO tweets (id, author_id, content, created_at) VALUES (?, ?, ?, ?)")
            .bind(&tweet.id)
            .bind(&tweet.author)
            .bind(&tweet.content)
            .bind(tweet.date)
            .execute(&mut *tx)
            .await?;

        for (position, tag) in tweet.hashtags.iter().enumerate() {
            sqlx::query("INSERT INTO tweet_hashtags (tweet_id, position, tag) VALUES (?, ?, ?)")
                .bind(&tweet.id)
                .bind(position as i64)
                .bind(tag)
                .execute(&mut *tx)
                .await?;
        }

        for user_id in &tweet.likes {
            sqlx::query(
                "INSERT OR IGNORE INTO tweet_likes (tweet_id, user_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(&tweet.id)
            .bind(user_id)
            .bind(tweet.date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get tweet by ID
    pub async fn get_tweet(&self, id: &TweetId) -> Result<Option<Tweet>, AppError> {
        observe_db_query("SELECT", "tweets");
        let row = sqlx::query_as::<_, TweetRow>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets t WHERE t.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Delete a tweet; its hashtags and likes go with it
    ///
    /// # Returns
    /// `true` if a tweet was deleted
    pub async fn delete_tweet(&self, id: &TweetId) -> Result<bool, AppError> {
        observe_db_query("DELETE", "tweets");
        let result = sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All tweets, newest first
    pub async fn list_tweets(&self) -> Result<Vec<Tweet>, AppError> {
        observe_db_query("SELECT", "tweets");
        let rows = sqlx::query_as::<_, TweetRow>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets t ORDER BY t.created_at DESC, t.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    /// Tweets whose hashtag list contains `tag` exactly, newest first
    pub async fn list_tweets_by_hashtag(&self, tag: &str) -> Result<Vec<Tweet>, AppError> {
        observe_db_query("SELECT", "tweets");
        let rows = sqlx::query_as::<_, TweetRow>(&format!(
            r#"
            SELECT {TWEET_COLUMNS}
            FROM tweets t
            WHERE t.id IN (SELECT tweet_id FROM tweet_hashtags WHERE tag = ?)
            ORDER BY t.created_at DESC, t.id DESC
            "#
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    /// Tweets written by `author`, newest first
    pub async fn list_tweets_by_author(&self, author: &UserId) -> Result<Vec<Tweet>, AppError> {
        observe_db_query("SELECT", "tweets");
        let rows = sqlx::query_as::<_, TweetRow>(&format!(
            r#"
            SELECT {TWEET_COLUMNS}
            FROM tweets t
            WHERE t.author_id = ?
            ORDER BY t.created_at DESC, t.id DESC
            "#
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    /// Every hashtag occurrence, scanning tweets oldest first
    pub async fn get_all_hashtags(&self) -> Result<Vec<String>, AppError> {
        observe_db_query("SELECT", "tweet_hashtags");
        let tags = sqlx::query_scalar::<_, String>(
            r#"
            SELECT th.tag
            FROM tweet_hashtags th
            INNER JOIN tweets t ON t.id = th.tweet_id
            ORDER BY t.created_at ASC, t.id ASC, th.position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Flip `user_id`'s like on a tweet
    ///
    /// Runs as one transaction; the DELETE takes SQLite's write lock, so two
    /// concurrent toggles cannot both observe the same state, and the tweet
    /// cannot vanish between the existence check and the INSERT.
    ///
    /// Dropping the future before commit rolls the transaction back.
    ///
    /// # Returns
    /// `true` if the tweet is liked by `user_id` afterwards
    ///
    /// # Errors
    /// `AppError::NotFound` if the tweet does not exist
    pub async fn toggle_like(&self, tweet_id: &TweetId, user_id: &UserId) -> Result<bool, AppError> {
        observe_db_query("TOGGLE", "tweet_likes");
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM tweet_likes WHERE tweet_id = ? AND user_id = ?")
            .bind(tweet_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let liked = if removed.rows_affected() > 0 {
            false
        } else {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tweets WHERE id = ?")
                .bind(tweet_id)
                .fetch_one(&mut *tx)
                .await?;
            if exists == 0 {
                return Err(AppError::NotFound("Tweet not found".to_string()));
            }

            sqlx::query("INSERT INTO tweet_likes (tweet_id, user_id, created_at) VALUES (?, ?, ?)")
                .bind(tweet_id)
                .bind(user_id)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
            true
        };

        tx.commit().await?;
        Ok(liked)
    }

    /// Attach hashtags and likes to tweet rows, preserving row order
    async fn hydrate(&self, rows: Vec<TweetRow>) -> Result<Vec<Tweet>, AppError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<&TweetId> = rows.iter().map(|row| &row.id).collect();
        let mut hashtags: HashMap<TweetId, Vec<String>> = HashMap::new();
        let mut likes: HashMap<TweetId, Vec<UserId>> = HashMap::new();

        for chunk in ids.chunks(IN_CLAUSE_CHUNK) {
            let mut query_builder = QueryBuilder::<Sqlite>::new(
                "SELECT tweet_id, tag FROM tweet_hashtags WHERE tweet_id IN (",
            );
            {
                let mut separated = query_builder.separated(", ");
                for id in chunk {
                    separated.push_bind(id.as_str());
                }
            }
            query_builder.push(") ORDER BY tweet_id, position ASC");

            let tag_rows = query_builder
                .build_query_as::<(TweetId, String)>()
                .fetch_all(&self.pool)
                .await?;
            for (tweet_id, tag) in tag_rows {
                hashtags.entry(tweet_id).or_default().push(tag);
            }

            let mut query_builder = QueryBuilder::<Sqlite>::new(
                "SELECT tweet_id, user_id FROM tweet_likes WHERE tweet_id IN (",
            );
            {
                let mut separated = query_builder.separated(", ");
                for id in chunk {
                    separated.push_bind(id.as_str());
                }
            }
            query_builder.push(") ORDER BY tweet_id, created_at ASC, user_id ASC");

            let like_rows = query_builder
                .build_query_as::<(TweetId, UserId)>()
                .fetch_all(&self.pool)
                .await?;
            for (tweet_id, user_id) in like_rows {
                likes.entry(tweet_id).or_default().push(user_id);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| Tweet {
                hashtags: hashtags.remove(&row.id).unwrap_or_default(),
                likes: likes.remove(&row.id).unwrap_or_default(),
                id: row.id,
                content: row.content,
                date: row.created_at,
                author: row.author_id,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::database_file_path;
    use std::path::PathBuf;

    #[test]
    fn file_path_is_taken_from_connection_string() {
        assert_eq!(
            database_file_path("sqlite://data/hackatweet.db?mode=rwc"),
            Some(PathBuf::from("data/hackatweet.db"))
        );
        assert_eq!(
            database_file_path("sqlite:/tmp/x.db"),
            Some(PathBuf::from("/tmp/x.db"))
        );
    }

    #[test]
    fn memory_databases_have_no_file() {
        assert_eq!(database_file_path("sqlite::memory:"), None);
        assert_eq!(database_file_path("postgres://localhost/db"), None);
    }
}
