mod users;
mod videos;

use sqlx::PgPool;

use super::{migrations, DatabaseError};

const USER_COLUMNS: &str =
    "id, username, password, role, profile_photo, subscribers, subscribed_users, created";

const VIDEO_COLUMNS: &str =
    "id, user_id, title, descr, img_url, video_url, views, tags, likes, dislikes, created_at, updated_at";

/// Postgres-backed implementation of both store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::run(&self.pool).await
    }
}

/// `users.username` is the only unique key, so any unique violation is a username clash.
fn username_conflict(err: sqlx::Error) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::UniqueViolation("Username already exists.".to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}
