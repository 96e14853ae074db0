use axum::extract::State;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};

/// GET /api/v1/users/find/:id
pub async fn find(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.find_one_by_id(id).await?))
}
