use std::sync::Arc;

use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::validation::{optional_text, parse_tags, require_text};
use crate::database::models::{NewVideo, Video, VideoChanges};
use crate::database::{UserStore, VideoStore};
use crate::error::ApiError;

/// Client-writable video fields. Owner, counters and engagement sets are
/// absent on purpose; unknown keys in the body are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInput {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub img_url: Option<String>,
    pub video_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct VideoService {
    videos: Arc<dyn VideoStore>,
    users: Arc<dyn UserStore>,
    random_sample_size: usize,
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl VideoService {
    pub fn new(videos: Arc<dyn VideoStore>, users: Arc<dyn UserStore>, random_sample_size: usize) -> Self {
        Self {
            videos,
            users,
            random_sample_size,
        }
    }

    pub async fn create(&self, owner_id: Uuid, input: VideoInput) -> Result<Video, ApiError> {
        let video = NewVideo {
            user_id: owner_id,
            title: require_text("title", input.title)?,
            desc: require_text("desc", input.desc)?,
            img_url: require_text("imgUrl", input.img_url)?,
            video_url: require_text("videoUrl", input.video_url)?,
            tags: clean_tags(input.tags.unwrap_or_default()),
        };

        let video = self.videos.insert_video(video).await?;
        info!("User {} uploaded video {}", owner_id, video.id);
        Ok(video)
    }

    /// Fetch a video the caller owns. Absent videos are a bad request,
    /// foreign ones unauthorized.
    async fn owned_by(&self, id: Uuid, caller_id: Uuid) -> Result<Video, ApiError> {
        let video = self
            .videos
            .find_video(id)
            .await?
            .ok_or_else(|| ApiError::bad_request("No video with that id found!"))?;

        if video.user_id != caller_id {
            warn!("User {} denied access to video {}", caller_id, id);
            return Err(ApiError::unauthorized("You are not allowed to do that!"));
        }
        Ok(video)
    }

    pub async fn update(&self, id: Uuid, input: VideoInput, caller_id: Uuid) -> Result<Video, ApiError> {
        self.owned_by(id, caller_id).await?;

        let changes = VideoChanges {
            title: optional_text("title", input.title)?,
            desc: optional_text("desc", input.desc)?,
            img_url: optional_text("imgUrl", input.img_url)?,
            video_url: optional_text("videoUrl", input.video_url)?,
            tags: input.tags.map(clean_tags),
        };

        // Deleted between the ownership check and the write.
        self.videos
            .update_video(id, changes)
            .await?
            .ok_or_else(|| ApiError::bad_request("No video with that id found!"))
    }

    pub async fn delete(&self, id: Uuid, caller_id: Uuid) -> Result<Video, ApiError> {
        self.owned_by(id, caller_id).await?;

        let deleted = self
            .videos
            .delete_video(id)
            .await?
            .ok_or_else(|| ApiError::bad_request("No video with that id found!"))?;

        info!("User {} deleted video {}", caller_id, id);
        Ok(deleted)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Video, ApiError> {
        self.videos
            .find_video(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))
    }

    pub async fn increment_view(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.videos.increment_views(id).await? {
            return Err(ApiError::bad_request("No video with that id found!"));
        }
        Ok(())
    }

    pub async fn list_random(&self) -> Result<Vec<Video>, ApiError> {
        Ok(self.videos.random_videos(self.random_sample_size).await?)
    }

    pub async fn list_trending(&self) -> Result<Vec<Video>, ApiError> {
        Ok(self.videos.trending_videos().await?)
    }

    /// Videos from every channel the caller follows, channel by channel in
    /// subscription order.
    pub async fn list_by_subscriptions(&self, caller_id: Uuid) -> Result<Vec<Video>, ApiError> {
        let caller = self
            .users
            .find_user(caller_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let per_channel = try_join_all(
            caller
                .subscribed_users
                .iter()
                .map(|channel| self.videos.videos_by_owner(*channel)),
        )
        .await?;

        Ok(per_channel.into_iter().flatten().collect())
    }

    pub async fn list_by_tags(&self, tags: Option<&str>) -> Result<Vec<Video>, ApiError> {
        let tags = parse_tags(tags)?;
        Ok(self.videos.videos_with_any_tag(&tags).await?)
    }

    pub async fn search_by_title(&self, query: Option<&str>) -> Result<Vec<Video>, ApiError> {
        let query = match query {
            Some(q) if !q.is_empty() => q,
            _ => return Err(ApiError::validation("query", "is required")),
        };
        Ok(self.videos.search_titles(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewUser, Role};
    use crate::database::MemoryStore;
    use axum::http::StatusCode;

    struct Fixture {
        store: Arc<MemoryStore>,
        videos: VideoService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::default());
        Fixture {
            videos: VideoService::new(store.clone(), store.clone(), 40),
            store,
        }
    }

    async fn user(store: &MemoryStore, name: &str) -> Uuid {
        store
            .insert_user(NewUser {
                username: name.to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap()
            .id
    }

    fn input(title: &str, tags: &[&str]) -> VideoInput {
        VideoInput {
            title: Some(title.to_string()),
            desc: Some("a video".to_string()),
            img_url: Some("https://cdn.example/i.png".to_string()),
            video_url: Some("https://cdn.example/v.mp4".to_string()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    #[tokio::test]
    async fn create_requires_media_fields() {
        let f = fixture();
        let owner = user(&f.store, "owner").await;

        let mut missing = input("clip", &[]);
        missing.video_url = None;
        let err = f.videos.create(owner, missing).await.unwrap_err();
        assert_eq!(err.to_json()["field"], "videoUrl");

        let video = f.videos.create(owner, input("clip", &[" music "])).await.unwrap();
        assert_eq!(video.user_id, owner);
        assert_eq!(video.views, 0);
        assert_eq!(video.tags, vec!["music"]);
    }

    #[tokio::test]
    async fn only_the_owner_may_update_or_delete() {
        let f = fixture();
        let owner = user(&f.store, "owner").await;
        let other = user(&f.store, "other").await;
        let video = f.videos.create(owner, input("clip", &[])).await.unwrap();

        let change = VideoInput {
            title: Some("renamed".to_string()),
            ..Default::default()
        };
        let err = f.videos.update(video.id, change, other).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = f.videos.delete(video.id, other).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let change = VideoInput {
            title: Some("renamed".to_string()),
            ..Default::default()
        };
        let updated = f.videos.update(video.id, change, owner).await.unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.desc, "a video");

        f.videos.delete(video.id, owner).await.unwrap();
        let err = f.videos.get_by_id(video.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_video_is_a_bad_request_for_mutations() {
        let f = fixture();
        let owner = user(&f.store, "owner").await;

        let err = f.videos.delete(Uuid::new_v4(), owner).await.unwrap_err();
        assert_eq!(err.message(), "No video with that id found!");

        let err = f.videos.increment_view(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn subscription_feed_follows_subscription_order() {
        let f = fixture();
        let viewer = user(&f.store, "viewer").await;
        let first = user(&f.store, "first").await;
        let second = user(&f.store, "second").await;

        let b1 = f.videos.create(second, input("b1", &[])).await.unwrap();
        let a1 = f.videos.create(first, input("a1", &[])).await.unwrap();
        let a2 = f.videos.create(first, input("a2", &[])).await.unwrap();

        f.store.subscribe(viewer, first).await.unwrap();
        f.store.subscribe(viewer, second).await.unwrap();

        let feed: Vec<Uuid> = f
            .videos
            .list_by_subscriptions(viewer)
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(feed, vec![a1.id, a2.id, b1.id]);
    }

    #[tokio::test]
    async fn tag_and_search_queries_are_required() {
        let f = fixture();
        assert!(f.videos.list_by_tags(None).await.is_err());
        assert!(f.videos.search_by_title(Some("")).await.is_err());
    }
}
