use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{NewUser, NewVideo, User, UserChanges, Video, VideoChanges};
use super::{DatabaseError, UserStore, VideoStore};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    videos: Vec<Video>,
}

/// Process-local store for development and tests. Every multi-record
/// mutation happens under a single write guard.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

fn insert_unique(set: &mut Vec<Uuid>, id: Uuid) {
    if !set.contains(&id) {
        set.push(id);
    }
}

fn remove(set: &mut Vec<Uuid>, id: Uuid) {
    set.retain(|member| *member != id);
}

fn username_taken(users: &[User], username: &str, except: Option<Uuid>) -> bool {
    users
        .iter()
        .any(|u| u.username == username && Some(u.id) != except)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if username_taken(&state.users, &user.username, None) {
            return Err(DatabaseError::UniqueViolation("Username already exists.".to_string()));
        }

        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            password: user.password_hash,
            role: user.role,
            profile_photo: None,
            subscribers: Vec::new(),
            subscribed_users: Vec::new(),
            created: Utc::now(),
        };
        state.users.push(record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.state.read().await.users.clone())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let mut state = self.state.write().await;

        if let Some(username) = &changes.username {
            if username_taken(&state.users, username, Some(id)) {
                return Err(DatabaseError::UniqueViolation("Username already exists.".to_string()));
            }
        }

        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(hash) = changes.password_hash {
            user.password = hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(photo) = changes.profile_photo {
            user.profile_photo = photo;
        }

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let mut state = self.state.write().await;

        let Some(index) = state.users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        let deleted = state.users.remove(index);

        for user in state.users.iter_mut() {
            remove(&mut user.subscribers, id);
            remove(&mut user.subscribed_users, id);
        }

        Ok(Some(deleted))
    }

    async fn subscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        for user in state.users.iter_mut() {
            if user.id == user_id {
                insert_unique(&mut user.subscribed_users, target_id);
            }
            if user.id == target_id {
                insert_unique(&mut user.subscribers, user_id);
            }
        }
        Ok(())
    }

    async fn unsubscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        for user in state.users.iter_mut() {
            if user.id == user_id {
                remove(&mut user.subscribed_users, target_id);
            }
            if user.id == target_id {
                remove(&mut user.subscribers, user_id);
            }
        }
        Ok(())
    }
}

impl MemoryStore {
    async fn videos_where<F>(&self, predicate: F) -> Vec<Video>
    where
        F: Fn(&Video) -> bool + Send,
    {
        let state = self.state.read().await;
        let mut videos: Vec<Video> = state.videos.iter().filter(|v| predicate(v)).cloned().collect();
        videos.sort_by_key(|v| v.created_at);
        videos
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn insert_video(&self, video: NewVideo) -> Result<Video, DatabaseError> {
        let now = Utc::now();
        let record = Video {
            id: Uuid::new_v4(),
            user_id: video.user_id,
            title: video.title,
            desc: video.desc,
            img_url: video.img_url,
            video_url: video.video_url,
            views: 0,
            tags: video.tags,
            likes: Vec::new(),
            dislikes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.videos.push(record.clone());
        Ok(record)
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.videos.iter().find(|v| v.id == id).cloned())
    }

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> Result<Option<Video>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some(video) = state.videos.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            video.title = title;
        }
        if let Some(desc) = changes.desc {
            video.desc = desc;
        }
        if let Some(img_url) = changes.img_url {
            video.img_url = img_url;
        }
        if let Some(video_url) = changes.video_url {
            video.video_url = video_url;
        }
        if let Some(tags) = changes.tags {
            video.tags = tags;
        }
        video.updated_at = Utc::now();

        Ok(Some(video.clone()))
    }

    async fn delete_video(&self, id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let mut state = self.state.write().await;
        let index = state.videos.iter().position(|v| v.id == id);
        Ok(index.map(|i| state.videos.remove(i)))
    }

    async fn increment_views(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        match state.videos.iter_mut().find(|v| v.id == id) {
            Some(video) => {
                video.views += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn random_videos(&self, limit: usize) -> Result<Vec<Video>, DatabaseError> {
        let state = self.state.read().await;
        let sample: Vec<Video> = {
            let mut rng = rand::thread_rng();
            state
                .videos
                .choose_multiple(&mut rng, limit)
                .cloned()
                .collect()
        };
        Ok(sample)
    }

    async fn trending_videos(&self) -> Result<Vec<Video>, DatabaseError> {
        let mut videos = self.state.read().await.videos.clone();
        videos.sort_by(|a, b| b.views.cmp(&a.views).then(b.created_at.cmp(&a.created_at)));
        Ok(videos)
    }

    async fn videos_by_owner(&self, user_id: Uuid) -> Result<Vec<Video>, DatabaseError> {
        Ok(self.videos_where(|v| v.user_id == user_id).await)
    }

    async fn videos_with_any_tag(&self, tags: &[String]) -> Result<Vec<Video>, DatabaseError> {
        Ok(self.videos_where(|v| v.tags.iter().any(|t| tags.contains(t))).await)
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<Video>, DatabaseError> {
        let needle = query.to_lowercase();
        Ok(self
            .videos_where(|v| v.title.to_lowercase().contains(&needle))
            .await)
    }

    async fn like_video(&self, id: Uuid, user_id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.videos.iter_mut().find(|v| v.id == id).map(|video| {
            insert_unique(&mut video.likes, user_id);
            remove(&mut video.dislikes, user_id);
            video.clone()
        }))
    }

    async fn dislike_video(&self, id: Uuid, user_id: Uuid) -> Result<Option<Video>, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.videos.iter_mut().find(|v| v.id == id).map(|video| {
            insert_unique(&mut video.dislikes, user_id);
            remove(&mut video.likes, user_id);
            video.clone()
        }))
    }
}
