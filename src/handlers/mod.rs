// handlers/mod.rs - three security tiers
//
// Public (no identity) → Protected (signed-in caller) → Elevated (owner or admin).
// Each tier's router applies its own guard with `route_layer`, so a path
// belongs to exactly one tier.

pub mod elevated;
pub mod protected;
pub mod public;

use axum::response::IntoResponse;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - liveness text.
pub async fn root() -> &'static str {
    "hello world"
}

/// Any path no tier claims.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// GET /health - pings the store.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.database.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "database": "unavailable" })),
            )
        }
    }
}
