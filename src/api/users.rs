//! Account endpoints
//!
//! Signup, signin, follow toggle, connections and profile lookup.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;

use crate::AppState;
use crate::api::converters::{summary_to_connection, user_to_auth_response};
use crate::api::dto::*;
use crate::error::AppError;
use crate::service::IdentityService;

fn build_identity_service(state: &AppState) -> IdentityService {
    IdentityService::new(state.db.clone(), state.config.accounts.default_avatar.clone())
}

/// Create users router, mounted under `/users`
pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/follow", put(toggle_follow))
        .route("/connections/:token", get(connections))
        .route("/:username", get(profile))
}

/// POST /users/signup
async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let user = build_identity_service(&state)
        .signup(
            request.username.as_deref().unwrap_or_default(),
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(user_to_auth_response(user))))
}

/// POST /users/signin
async fn signin(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<SigninRequest>, AppError>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let user = build_identity_service(&state)
        .signin(
            request.username.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(user_to_auth_response(user))))
}

/// PUT /users/follow
async fn toggle_follow(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<FollowRequest>, AppError>,
) -> Result<Json<ApiResponse<FollowResponse>>, AppError> {
    let following = build_identity_service(&state)
        .toggle_follow(
            request.token.as_deref().unwrap_or_default(),
            request.target_token.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(FollowResponse { following })))
}

/// GET /users/connections/:token
async fn connections(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<ConnectionsResponse>>, AppError> {
    let connections = build_identity_service(&state).get_connections(&token).await?;

    Ok(Json(ApiResponse::ok(ConnectionsResponse {
        followers: connections
            .followers
            .into_iter()
            .map(summary_to_connection)
            .collect(),
        following: connections
            .following
            .into_iter()
            .map(summary_to_connection)
            .collect(),
    })))
}

/// GET /users/:username
///
/// Returns the stored record as-is, credentials included.
async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let user = build_identity_service(&state).get_profile(&username).await?;

    Ok(Json(ApiResponse::ok(ProfileResponse { user })))
}
