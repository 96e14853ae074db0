// handlers/public/mod.rs - endpoints that need no identity
//
// Sign-up/sign-in issue the session cookie; lookups and the view counter
// are open to anonymous visitors.

pub mod auth;
pub mod users;
pub mod videos;

use axum::routing::{get, post, put};
use axum::Router;

use crate::app::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/signin", post(auth::signin))
        .route("/api/v1/auth/signout", post(auth::signout))
        .route("/api/v1/users/find/:id", get(users::find))
        .route("/api/v1/videos/find/:id", get(videos::find))
        .route("/api/v1/videos/view/:id", put(videos::add_view))
        .route("/api/v1/videos/trend", get(videos::trend))
        .route("/api/v1/videos/random", get(videos::random))
        .route("/api/v1/videos/tags", get(videos::by_tags))
        .route("/api/v1/videos/search", get(videos::search))
}
