#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use vidhub_api::app::{router, AppContext, AppState};
use vidhub_api::config::AppConfig;
use vidhub_api::database::models::{Role, UserChanges};
use vidhub_api::database::Database;

/// A router served on an ephemeral local port over the in-memory store.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
}

/// A signed-in client; its cookie store carries `access_token`.
pub struct Session {
    pub client: Client,
    pub id: Uuid,
    pub token: String,
}

pub async fn spawn_app() -> Result<TestServer> {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    spawn_with(config).await
}

pub async fn spawn_with(config: AppConfig) -> Result<TestServer> {
    let state = AppContext::new(config, Database::in_memory());
    state.bootstrap_admin().await?;
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        state,
    })
}

pub fn cookie_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("failed to build http client")
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<Session> {
        self.session("/api/v1/auth/signup", StatusCode::CREATED, username, password)
            .await
    }

    pub async fn signin(&self, username: &str, password: &str) -> Result<Session> {
        self.session("/api/v1/auth/signin", StatusCode::OK, username, password)
            .await
    }

    async fn session(&self, path: &str, expected: StatusCode, username: &str, password: &str) -> Result<Session> {
        let client = cookie_client();
        let res = client
            .post(self.url(path))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == expected, "{} failed: {}", path, res.status());

        let body: Value = res.json().await?;
        let id = body["result"]["userInfo"]["id"]
            .as_str()
            .context("missing user id")?
            .parse()?;
        let token = body["result"]["token"]
            .as_str()
            .context("missing token")?
            .to_string();

        Ok(Session { client, id, token })
    }

    /// Promote directly in the store; the API only lets admins grant roles.
    pub async fn promote(&self, id: Uuid) -> Result<()> {
        let changes = UserChanges {
            role: Some(Role::Admin),
            ..Default::default()
        };
        self.state
            .database
            .users
            .update_user(id, changes)
            .await?
            .context("user to promote does not exist")?;
        Ok(())
    }

    pub async fn upload(&self, session: &Session, title: &str, tags: &[&str]) -> Result<Value> {
        let res = session
            .client
            .post(self.url("/api/v1/videos"))
            .json(&json!({
                "title": title,
                "desc": format!("{} description", title),
                "imgUrl": "https://cdn.example/thumb.png",
                "videoUrl": "https://cdn.example/video.mp4",
                "tags": tags,
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "upload failed: {}", res.status());
        Ok(res.json().await?)
    }
}
