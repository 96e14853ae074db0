//! Business rules sitting between the HTTP handlers and the stores.

pub mod user_service;
pub mod validation;
pub mod video_service;

pub use user_service::{AuthResponse, Credentials, UserService, UserUpdate};
pub use video_service::{VideoInput, VideoService};
