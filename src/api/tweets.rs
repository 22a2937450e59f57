//! Tweet endpoints

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{delete, get, put},
};
use axum_extra::extract::WithRejection;

use crate::AppState;
use crate::api::converters::{AuthorFields, tweets_to_response};
use crate::api::dto::*;
use crate::data::TweetId;
use crate::error::AppError;
use crate::service::TweetService;

const NO_HASHTAG_MATCHES: &str = "No tweets found with this hashtag";

fn build_tweet_service(state: &AppState) -> TweetService {
    TweetService::new(state.db.clone())
}

/// Create tweets router, mounted under `/tweets`
pub fn tweets_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tweets).post(create_tweet))
        .route("/trends", get(trends))
        .route("/like/:id", put(toggle_like))
        .route("/hashtag/:name", get(tweets_by_hashtag))
        .route("/user/:username", get(tweets_by_user))
        .route("/:id", delete(delete_tweet))
}

/// POST /tweets
async fn create_tweet(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateTweetRequest>, AppError>,
) -> Result<Json<ApiResponse<CreatedTweetResponse>>, AppError> {
    let tweet = build_tweet_service(&state)
        .create(
            request.content.as_deref().unwrap_or_default(),
            request.token.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(CreatedTweetResponse { tweet })))
}

/// GET /tweets
async fn list_tweets(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TweetsResponse>>, AppError> {
    let tweets = build_tweet_service(&state).list().await?;

    Ok(Json(ApiResponse::ok(TweetsResponse {
        tweets: tweets_to_response(tweets, AuthorFields::Email),
        message: None,
    })))
}

/// DELETE /tweets/:id
///
/// A missing or unreadable body counts as a missing token.
async fn delete_tweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<TokenRequest>>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    let token = body.and_then(|Json(request)| request.token);
    build_tweet_service(&state)
        .delete(&TweetId::from_string(id), token.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(Empty {})))
}

/// PUT /tweets/like/:id
async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<TokenRequest>>,
) -> Result<Json<ApiResponse<LikedResponse>>, AppError> {
    let token = body.and_then(|Json(request)| request.token);
    let liked = build_tweet_service(&state)
        .toggle_like(&TweetId::from_string(id), token.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(LikedResponse { liked })))
}

/// GET /tweets/hashtag/:name
///
/// `name` is given without the leading `#`.
async fn tweets_by_hashtag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<TweetsResponse>>, AppError> {
    let tweets = build_tweet_service(&state).by_hashtag(&name).await?;
    let message = tweets.is_empty().then(|| NO_HASHTAG_MATCHES.to_string());

    Ok(Json(ApiResponse::ok(TweetsResponse {
        tweets: tweets_to_response(tweets, AuthorFields::Email),
        message,
    })))
}

/// GET /tweets/trends
async fn trends(State(state): State<AppState>) -> Result<Json<ApiResponse<TrendsResponse>>, AppError> {
    let trends = build_tweet_service(&state).trends().await?;

    Ok(Json(ApiResponse::ok(TrendsResponse { trends })))
}

/// GET /tweets/user/:username
async fn tweets_by_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<TweetsResponse>>, AppError> {
    let tweets = build_tweet_service(&state).by_user(&username).await?;

    Ok(Json(ApiResponse::ok(TweetsResponse {
        tweets: tweets_to_response(tweets, AuthorFields::Avatar),
        message: None,
    })))
}
