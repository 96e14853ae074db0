use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sqlx(rename = "descr")]
    pub desc: String,
    pub img_url: String,
    pub video_url: String,
    pub views: i64,
    pub tags: Vec<String>,
    pub likes: Vec<Uuid>,
    pub dislikes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub user_id: Uuid,
    pub title: String,
    pub desc: String,
    pub img_url: String,
    pub video_url: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub img_url: Option<String>,
    pub video_url: Option<String>,
    pub tags: Option<Vec<String>>,
}
