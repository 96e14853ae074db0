pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{require_admin, require_self_or_admin, require_token, AuthUser, ACCESS_TOKEN_COOKIE};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult};
