use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use super::extract::ApiPath;
use crate::app::AppState;
use crate::database::models::{Role, User};
use crate::error::ApiError;

/// Name of the cookie carrying the session token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Caller identity, re-read from the store on every request so role
/// changes apply without a fresh sign-in.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Inserted by one of the require_* layers below.
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("You are not authenticated!"))
    }
}

/// Cookie first, then `Authorization: Bearer`.
fn token_from_request(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn resolve_identity(state: &AppState, token: Option<String>) -> Result<AuthUser, ApiError> {
    let token = token.ok_or_else(|| ApiError::unauthorized("You are not authenticated!"))?;
    let claims = state.tokens.decode(&token)?;

    let user = state
        .database
        .users
        .find_user(claims.id)
        .await?
        .ok_or_else(|| {
            warn!("Token presented for deleted account {}", claims.id);
            ApiError::unauthorized("You are not authenticated!")
        })?;

    Ok(AuthUser::from(user))
}

/// Any signed-in caller.
pub async fn require_token(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_request(&jar, request.headers());
    let user = resolve_identity(&state, token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// The account named by the `:id` path segment, or an admin.
pub async fn require_self_or_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiPath(id): ApiPath<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_request(&jar, request.headers());
    let user = resolve_identity(&state, token).await?;

    if user.id != id && !user.is_admin() {
        warn!("{} denied access to account {}", user.username, id);
        return Err(ApiError::unauthorized(
            "Only the owner or an admin is allowed for this request",
        ));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_request(&jar, request.headers());
    let user = resolve_identity(&state, token).await?;

    if !user.is_admin() {
        warn!("{} denied admin-only request", user.username);
        return Err(ApiError::unauthorized("Only admin is allowed for this request"));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn cookie_takes_precedence_over_bearer_header() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(token_from_request(&jar, &headers).as_deref(), Some("from-cookie"));
        assert_eq!(
            token_from_request(&CookieJar::new(), &headers).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn malformed_authorization_header_yields_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(token_from_request(&CookieJar::new(), &headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(token_from_request(&CookieJar::new(), &headers).is_none());
    }
}
