// handlers/elevated/mod.rs - account administration
//
// Two guards: `require_self_or_admin` for per-account writes keyed by `:id`,
// `require_admin` for the full user listing.

pub mod users;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, put};
use axum::Router;

use crate::app::AppState;
use crate::middleware::{require_admin, require_self_or_admin};

pub fn routes(state: AppState) -> Router<AppState> {
    let owner = Router::new()
        .route("/api/v1/users/:id", put(users::update).delete(users::delete))
        .route_layer(from_fn_with_state(state.clone(), require_self_or_admin));

    let admin = Router::new()
        .route("/api/v1/users", get(users::list))
        .route("/api/v1/users/", get(users::list))
        .route_layer(from_fn_with_state(state, require_admin));

    owner.merge(admin)
}
