use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{
        header::{HeaderName, ALLOW, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::models::User;
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::{self, elevated, protected, public};
use crate::services::{UserService, VideoService};

/// Shared, read-only state handed to every handler and guard.
pub struct AppContext {
    pub config: AppConfig,
    pub database: Database,
    pub tokens: TokenService,
    pub users: UserService,
    pub videos: VideoService,
}

pub type AppState = Arc<AppContext>;

impl AppContext {
    pub fn new(config: AppConfig, database: Database) -> AppState {
        let tokens = TokenService::new(&config.security.jwt_secret, config.token_ttl());

        let users = UserService::new(
            database.users.clone(),
            database.videos.clone(),
            tokens.clone(),
            config.security.bcrypt_cost,
        );
        let videos = VideoService::new(
            database.videos.clone(),
            database.users.clone(),
            config.api.random_sample_size,
        );

        Arc::new(Self {
            config,
            database,
            tokens,
            users,
            videos,
        })
    }

    /// Create the configured startup admin if it does not exist yet.
    pub async fn bootstrap_admin(&self) -> Result<Option<User>, ApiError> {
        let Some(admin) = &self.config.security.bootstrap_admin else {
            return Ok(None);
        };

        let user = self.users.ensure_admin(&admin.username, &admin.password).await?;
        info!("Admin account {} is ready", user.username);
        Ok(Some(user))
    }
}

pub fn router(state: AppState) -> Router {
    let config = &state.config;

    let mut app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(public::routes())
        .merge(protected::routes(state.clone()))
        .merge(elevated::routes(state.clone()))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(from_fn(json_error_bodies))
        .layer(from_fn(security_headers));

    if config.api.enable_response_compression {
        app = app.layer(CompressionLayer::new());
    }

    app.layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured origins; permissive when none are set.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        if config.is_production() {
            warn!("No CORS origins configured; allowing any origin without credentials");
        }
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Rejections produced by the router itself (wrong method, oversized body)
/// get the same JSON shape as handler errors.
async fn json_error_bodies(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }

    let error = match response.status() {
        StatusCode::METHOD_NOT_ALLOWED => ApiError::method_not_allowed("Method not allowed"),
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large("Request body is too large"),
        _ => return response,
    };

    let allow = response.headers().get(ALLOW).cloned();
    let mut replaced = error.into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(ALLOW, allow);
    }
    replaced
}

async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("SAMEORIGIN"),
    );
    headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("1; mode=block"),
    );

    response
}
