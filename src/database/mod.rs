pub mod memory;
pub mod migrations;
pub mod models;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{redact, DatabaseConfig, StorageBackend};
use models::{NewUser, NewVideo, User, UserChanges, Video, VideoChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("{0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for user accounts and the subscription graph.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Fails with `UniqueViolation` when the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, DatabaseError>;

    /// Removes the account and strips it from every other user's subscription sets.
    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// Adds `target_id` to `user_id.subscribed_users` and `user_id` to
    /// `target_id.subscribers` as one unit. Adding an existing member is a no-op.
    async fn subscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), DatabaseError>;

    /// Inverse of [`UserStore::subscribe`]; removing a non-member is a no-op.
    async fn unsubscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), DatabaseError>;
}

/// Persistence for videos and their engagement counters.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn insert_video(&self, video: NewVideo) -> Result<Video, DatabaseError>;

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, DatabaseError>;

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> Result<Option<Video>, DatabaseError>;

    async fn delete_video(&self, id: Uuid) -> Result<Option<Video>, DatabaseError>;

    /// Atomically bumps `views` by one. Returns false when the video does not exist.
    async fn increment_views(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Uniform random sample without replacement, at most `limit` videos.
    async fn random_videos(&self, limit: usize) -> Result<Vec<Video>, DatabaseError>;

    /// Every video, most viewed first.
    async fn trending_videos(&self) -> Result<Vec<Video>, DatabaseError>;

    /// A channel's videos in upload order.
    async fn videos_by_owner(&self, user_id: Uuid) -> Result<Vec<Video>, DatabaseError>;

    /// Videos carrying at least one of `tags`.
    async fn videos_with_any_tag(&self, tags: &[String]) -> Result<Vec<Video>, DatabaseError>;

    /// Case-insensitive literal substring match on the title.
    async fn search_titles(&self, query: &str) -> Result<Vec<Video>, DatabaseError>;

    /// Puts `user_id` in `likes` and takes it out of `dislikes` in one write.
    async fn like_video(&self, id: Uuid, user_id: Uuid) -> Result<Option<Video>, DatabaseError>;

    /// Puts `user_id` in `dislikes` and takes it out of `likes` in one write.
    async fn dislike_video(&self, id: Uuid, user_id: Uuid) -> Result<Option<Video>, DatabaseError>;
}

/// Handles to the configured stores.
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserStore>,
    pub videos: Arc<dyn VideoStore>,
}

impl Database {
    /// Connect to the configured backend. Postgres schemas are bootstrapped on connect.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage; data will not survive a restart");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let store = PgStore::new(Self::pool(config).await?);
                store.migrate().await?;
                Ok(Self::from_store(Arc::new(store)))
            }
        }
    }

    /// Open a Postgres pool without touching the schema.
    pub async fn pool(config: &DatabaseConfig) -> Result<sqlx::PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected to {}", redact(url));
        Ok(pool)
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::default()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserStore + VideoStore + 'static,
    {
        Self {
            users: store.clone(),
            videos: store,
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.users.ping().await
    }
}
