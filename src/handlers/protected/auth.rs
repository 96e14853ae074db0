use axum::extract::State;

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/v1/auth/me - the caller's current record.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.find_one_by_id(user.id).await?))
}
