// handlers/public/auth.rs - session acquisition

use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ACCESS_TOKEN_COOKIE};
use crate::services::{AuthResponse, Credentials};
use crate::error::ApiError;

type SessionResult = Result<(CookieJar, ApiResponse<Value>), ApiError>;

/// Session cookie living exactly as long as the token inside it.
fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let max_age = time::Duration::seconds(state.tokens.ttl().num_seconds());

    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(state.config.security.require_https)
        .max_age(max_age)
        .build()
}

fn with_session(state: &AppState, jar: CookieJar, result: AuthResponse, created: bool) -> SessionResult {
    let jar = jar.add(session_cookie(state, result.token.clone()));
    let body = json!({ "result": result });

    let response = if created {
        ApiResponse::created(body)
    } else {
        ApiResponse::success(body)
    };
    Ok((jar, response))
}

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(credentials): ApiJson<Credentials>,
) -> SessionResult {
    let result = state.users.signup(credentials).await?;
    with_session(&state, jar, result, true)
}

/// POST /api/v1/auth/signin
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(credentials): ApiJson<Credentials>,
) -> SessionResult {
    let result = state.users.authenticate(credentials).await?;
    with_session(&state, jar, result, false)
}

/// POST /api/v1/auth/signout - tokens are stateless, so this only drops the cookie.
pub async fn signout(jar: CookieJar) -> (CookieJar, ApiResponse<Value>) {
    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
    (jar, ApiResponse::success(json!({ "message": "Signed out successfully!" })))
}
