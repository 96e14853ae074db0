pub mod user;
pub mod video;

pub use user::{NewUser, Role, UnknownRole, User, UserChanges};
pub use video::{NewVideo, Video, VideoChanges};
