// handlers/protected/videos.rs - uploads and owner-only edits

use axum::extract::State;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Video;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::VideoInput;

/// POST /api/v1/videos - the caller becomes the owner.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<VideoInput>,
) -> ApiResult<Video> {
    Ok(ApiResponse::success(state.videos.create(user.id, input).await?))
}

/// PUT /api/v1/videos/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<VideoInput>,
) -> ApiResult<Video> {
    Ok(ApiResponse::success(state.videos.update(id, input, user.id).await?))
}

/// DELETE /api/v1/videos/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Video> {
    Ok(ApiResponse::success(state.videos.delete(id, user.id).await?))
}

/// GET /api/v1/videos/sub - feed from followed channels.
pub async fn subscriptions(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<Video>> {
    Ok(ApiResponse::success(state.videos.list_by_subscriptions(user.id).await?))
}
