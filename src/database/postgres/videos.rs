use async_trait::async_trait;
use uuid::Uuid;

use super::{PgStore, VIDEO_COLUMNS};
use crate::database::models::{NewVideo, Video, VideoChanges};
use crate::database::{DatabaseError, VideoStore};

impl PgStore {
    async fn select_videos(&self, filter: &str) -> Result<Vec<Video>, DatabaseError> {
        let sql = format!("SELECT {} FROM videos {}", VIDEO_COLUMNS, filter);
        let videos = sqlx::query_as::<_, Video>(&sql).fetch_all(&self.pool).await?;
        Ok(videos)
    }
}

#[async_trait]
impl VideoStore for PgStore {
    async fn insert_video(&self, video: NewVideo) -> Result<Video, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO videos (id, user_id, title, descr, img_url, video_url, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        );

        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(Uuid::new_v4())
            .bind(video.user_id)
            .bind(video.title)
            .bind(video.desc)
            .bind(video.img_url)
            .bind(video.video_url)
            .bind(video.tags)
            .fetch_one(&self.pool)
            .await?;
        Ok(video)
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let sql = format!("SELECT {} FROM videos WHERE id = $1", VIDEO_COLUMNS);
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> Result<Option<Video>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE videos SET
                title      = COALESCE($2, title),
                descr      = COALESCE($3, descr),
                img_url    = COALESCE($4, img_url),
                video_url  = COALESCE($5, video_url),
                tags       = COALESCE($6, tags),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        );

        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.desc)
            .bind(changes.img_url)
            .bind(changes.video_url)
            .bind(changes.tags)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn delete_video(&self, id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let sql = format!("DELETE FROM videos WHERE id = $1 RETURNING {}", VIDEO_COLUMNS);
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn increment_views(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE videos SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn random_videos(&self, limit: usize) -> Result<Vec<Video>, DatabaseError> {
        let sql = format!("SELECT {} FROM videos ORDER BY random() LIMIT $1", VIDEO_COLUMNS);
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(videos)
    }

    async fn trending_videos(&self) -> Result<Vec<Video>, DatabaseError> {
        self.select_videos("ORDER BY views DESC, created_at DESC").await
    }

    async fn videos_by_owner(&self, user_id: Uuid) -> Result<Vec<Video>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at ASC",
            VIDEO_COLUMNS
        );
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(videos)
    }

    async fn videos_with_any_tag(&self, tags: &[String]) -> Result<Vec<Video>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM videos WHERE tags && $1::text[] ORDER BY created_at ASC",
            VIDEO_COLUMNS
        );
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(tags.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(videos)
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<Video>, DatabaseError> {
        // strpos keeps the match literal; LIKE/regex would treat % _ . * as operators.
        let sql = format!(
            "SELECT {} FROM videos WHERE strpos(lower(title), lower($1)) > 0 ORDER BY created_at ASC",
            VIDEO_COLUMNS
        );
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(videos)
    }

    async fn like_video(&self, id: Uuid, user_id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE videos SET
                likes    = CASE WHEN $2::uuid = ANY(likes) THEN likes ELSE array_append(likes, $2::uuid) END,
                dislikes = array_remove(dislikes, $2::uuid)
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        );
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn dislike_video(&self, id: Uuid, user_id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE videos SET
                dislikes = CASE WHEN $2::uuid = ANY(dislikes) THEN dislikes ELSE array_append(dislikes, $2::uuid) END,
                likes    = array_remove(likes, $2::uuid)
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        );
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }
}
