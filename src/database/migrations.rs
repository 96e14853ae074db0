use sqlx::PgPool;
use tracing::info;

use super::DatabaseError;

/// Idempotent schema bootstrap, applied in order.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id                UUID PRIMARY KEY,
        username          TEXT NOT NULL UNIQUE,
        password          TEXT NOT NULL,
        role              TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
        profile_photo     TEXT,
        subscribers       UUID[] NOT NULL DEFAULT '{}',
        subscribed_users  UUID[] NOT NULL DEFAULT '{}',
        created           TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS videos (
        id          UUID PRIMARY KEY,
        user_id     UUID NOT NULL,
        title       TEXT NOT NULL,
        descr       TEXT NOT NULL,
        img_url     TEXT NOT NULL,
        video_url   TEXT NOT NULL,
        views       BIGINT NOT NULL DEFAULT 0,
        tags        TEXT[] NOT NULL DEFAULT '{}',
        likes       UUID[] NOT NULL DEFAULT '{}',
        dislikes    UUID[] NOT NULL DEFAULT '{}',
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_videos_user_id ON videos (user_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_videos_views ON videos (views DESC)",
    "CREATE INDEX IF NOT EXISTS idx_videos_tags ON videos USING GIN (tags)",
];

pub async fn run(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database migrations complete");
    Ok(())
}
