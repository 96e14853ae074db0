// handlers/protected/mod.rs - endpoints for any signed-in caller
//
// Guarded by `require_token`, which attaches the live `AuthUser`.

pub mod auth;
pub mod users;
pub mod videos;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::app::AppState;
use crate::middleware::require_token;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/users/sub/:id", patch(users::subscribe))
        .route("/api/v1/users/unsub/:id", patch(users::unsubscribe))
        .route("/api/v1/users/like/:video_id", patch(users::like))
        .route("/api/v1/users/dislike/:video_id", patch(users::dislike))
        .route("/api/v1/videos", post(videos::create))
        .route("/api/v1/videos/", post(videos::create))
        .route("/api/v1/videos/sub", get(videos::subscriptions))
        .route("/api/v1/videos/:id", put(videos::update).delete(videos::delete))
        .route_layer(from_fn_with_state(state, require_token))
}
