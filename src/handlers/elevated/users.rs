use axum::extract::State;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::UserUpdate;

/// PUT /api/v1/users/:id - owner or admin; role changes need admin.
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.update_one(id, update, caller.role).await?))
}

/// DELETE /api/v1/users/:id
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.delete_one(id).await?))
}

/// GET /api/v1/users - admin only.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(state.users.get_all_users().await?))
}
