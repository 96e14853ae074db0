// handlers/public/videos.rs - anonymous video browsing

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Video;
use crate::middleware::{ApiPath, ApiQuery, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct TagsQuery {
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// GET /api/v1/videos/find/:id
pub async fn find(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Video> {
    Ok(ApiResponse::success(state.videos.get_by_id(id).await?))
}

/// PUT /api/v1/videos/view/:id
pub async fn add_view(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    state.videos.increment_view(id).await?;
    Ok(ApiResponse::success(json!({ "message": "The view has been increased." })))
}

/// GET /api/v1/videos/trend
pub async fn trend(State(state): State<AppState>) -> ApiResult<Vec<Video>> {
    Ok(ApiResponse::success(state.videos.list_trending().await?))
}

/// GET /api/v1/videos/random
pub async fn random(State(state): State<AppState>) -> ApiResult<Vec<Video>> {
    Ok(ApiResponse::success(state.videos.list_random().await?))
}

/// GET /api/v1/videos/tags?tags=a,b
pub async fn by_tags(State(state): State<AppState>, ApiQuery(query): ApiQuery<TagsQuery>) -> ApiResult<Vec<Video>> {
    Ok(ApiResponse::success(state.videos.list_by_tags(query.tags.as_deref()).await?))
}

/// GET /api/v1/videos/search?query=
pub async fn search(State(state): State<AppState>, ApiQuery(query): ApiQuery<SearchQuery>) -> ApiResult<Vec<Video>> {
    Ok(ApiResponse::success(state.videos.search_by_title(query.query.as_deref()).await?))
}
