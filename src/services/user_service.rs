use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::validation::{normalize_username, optional_text, require_password, validate_new_password};
use crate::auth::{hash_password, verify_password, TokenService};
use crate::database::models::{NewUser, Role, User, UserChanges, Video};
use crate::database::{UserStore, VideoStore};
use crate::error::ApiError;

/// Sign-up / sign-in payload. Fields are optional so that a missing one
/// surfaces as a validation error instead of a JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user_info: User,
    /// Token expiry, seconds since the epoch.
    pub expires_at: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    /// Absent leaves the photo alone; `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub profile_photo: Option<Option<String>>,
}

/// Tells an explicit `null` (`Some(None)`) apart from a missing key (`None`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Accounts, sessions and the subscription graph.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    videos: Arc<dyn VideoStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        videos: Arc<dyn VideoStore>,
        tokens: TokenService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            videos,
            tokens,
            bcrypt_cost,
        }
    }

    pub async fn signup(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        let user = self
            .register(credentials.username.as_deref(), credentials.password.as_deref(), Role::User)
            .await?;

        info!("User {} signed up", user.username);
        self.session(user, "User created!")
    }

    pub async fn authenticate(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        let username = normalize_username(credentials.username.as_deref())?;
        let password = require_password(credentials.password.as_deref())?;

        let Some(user) = self.users.find_user_by_username(&username).await? else {
            warn!("Sign-in for unknown user {}", username);
            return Err(ApiError::forbidden("Wrong username or password."));
        };

        if !verify_password(password, &user.password).await? {
            warn!("Wrong password for {}", username);
            return Err(ApiError::bad_request("Wrong username or password."));
        }

        info!("User {} signed in", user.username);
        self.session(user, "Authentication successful!")
    }

    /// Create an account with an explicit role. Used by sign-up and the
    /// admin bootstrap command.
    pub async fn register(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        role: Role,
    ) -> Result<User, ApiError> {
        let username = normalize_username(username)?;
        let password = validate_new_password(password)?;

        if self.users.find_user_by_username(&username).await?.is_some() {
            return Err(ApiError::bad_request("Username already exists."));
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let user = self
            .users
            .insert_user(NewUser {
                username,
                password_hash,
                role,
            })
            .await?;
        Ok(user)
    }

    /// Make sure an admin with this name exists. An existing admin is left
    /// untouched; a regular account with the name is a conflict.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let name = normalize_username(Some(username))?;

        match self.users.find_user_by_username(&name).await? {
            Some(user) if user.role == Role::Admin => Ok(user),
            Some(_) => Err(ApiError::bad_request("Username already exists.")),
            None => self.register(Some(&name), Some(password), Role::Admin).await,
        }
    }

    fn session(&self, user: User, message: &str) -> Result<AuthResponse, ApiError> {
        let issued = self.tokens.issue(&user)?;
        Ok(AuthResponse {
            message: message.to_string(),
            token: issued.token,
            user_info: user,
            expires_at: issued.claims.exp,
        })
    }

    pub async fn find_one_by_id(&self, id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.users.list_users().await?)
    }

    /// Apply a partial update. Only admins may change a role; non-admins only
    /// reach their own account, so restating their current role is allowed.
    pub async fn update_one(&self, id: Uuid, update: UserUpdate, caller_role: Role) -> Result<User, ApiError> {
        let role = match update.role {
            Some(role) if caller_role == Role::Admin => Some(role),
            Some(role) if role == caller_role => None,
            Some(_) => {
                warn!("Non-admin attempted to change the role of {}", id);
                return Err(ApiError::forbidden("Only admin can change roles"));
            }
            None => None,
        };

        let username = match update.username.as_deref() {
            Some(raw) => Some(normalize_username(Some(raw))?),
            None => None,
        };
        let password_hash = match update.password.as_deref() {
            Some(raw) => Some(hash_password(validate_new_password(Some(raw))?, self.bcrypt_cost).await?),
            None => None,
        };

        let changes = UserChanges {
            username,
            password_hash,
            role,
            profile_photo: update
                .profile_photo
                .map(|photo| optional_text("profilePhoto", photo))
                .transpose()?,
        };

        if changes.is_empty() {
            return self.find_one_by_id(id).await;
        }

        self.users
            .update_user(id, changes)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn delete_one(&self, id: Uuid) -> Result<User, ApiError> {
        let deleted = self
            .users
            .delete_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        info!("Deleted user {}", deleted.username);
        Ok(deleted)
    }

    pub async fn subscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), ApiError> {
        self.check_subscription_target(user_id, target_id).await?;
        self.users.subscribe(user_id, target_id).await?;
        info!("{} subscribed to {}", user_id, target_id);
        Ok(())
    }

    pub async fn unsubscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), ApiError> {
        self.check_subscription_target(user_id, target_id).await?;
        self.users.unsubscribe(user_id, target_id).await?;
        info!("{} unsubscribed from {}", user_id, target_id);
        Ok(())
    }

    async fn check_subscription_target(&self, user_id: Uuid, target_id: Uuid) -> Result<(), ApiError> {
        if user_id == target_id {
            return Err(ApiError::bad_request("You cannot subscribe to yourself."));
        }
        self.find_one_by_id(target_id).await.map(|_| ())
    }

    pub async fn like_video(&self, user_id: Uuid, video_id: Uuid) -> Result<Video, ApiError> {
        self.videos
            .like_video(video_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))
    }

    pub async fn dislike_video(&self, user_id: Uuid, video_id: Uuid) -> Result<Video, ApiError> {
        self.videos
            .dislike_video(video_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))
    }
}
