// handlers/protected/users.rs - subscriptions and reactions

use axum::extract::State;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Video;
use crate::middleware::{ApiPath, ApiResponse, ApiResult, AuthUser};

/// PATCH /api/v1/users/sub/:id
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(target): ApiPath<Uuid>,
) -> ApiResult<Value> {
    state.users.subscribe(user.id, target).await?;
    Ok(ApiResponse::success(json!({ "message": "Subscribed successfully!" })))
}

/// PATCH /api/v1/users/unsub/:id
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(target): ApiPath<Uuid>,
) -> ApiResult<Value> {
    state.users.unsubscribe(user.id, target).await?;
    Ok(ApiResponse::success(json!({ "message": "Unsubscribed successfully!" })))
}

/// PATCH /api/v1/users/like/:video_id
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(video_id): ApiPath<Uuid>,
) -> ApiResult<Video> {
    Ok(ApiResponse::success(state.users.like_video(user.id, video_id).await?))
}

/// PATCH /api/v1/users/dislike/:video_id
pub async fn dislike(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(video_id): ApiPath<Uuid>,
) -> ApiResult<Video> {
    Ok(ApiResponse::success(state.users.dislike_video(user.id, video_id).await?))
}
