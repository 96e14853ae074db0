mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{spawn_app, spawn_with};
use vidhub_api::config::{AdminCredentials, AppConfig};

#[tokio::test]
async fn public_lookup_hides_password() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;

    let res = reqwest::get(server.url(&format!("/api/v1/users/find/{}", alice.id))).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["username"], "alice");
    assert!(body.get("password").is_none());
    assert!(body["subscribers"].as_array().is_some_and(|s| s.is_empty()));

    let res = reqwest::get(server.url(&format!("/api/v1/users/find/{}", uuid::Uuid::new_v4()))).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = reqwest::get(server.url("/api/v1/users/find/not-a-uuid")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn users_may_update_only_themselves() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let bob = server.signup("bob", "secret1").await?;

    let res = alice
        .client
        .put(server.url(&format!("/api/v1/users/{}", alice.id)))
        .json(&json!({ "profilePhoto": "https://cdn.example/alice.png", "username": "Alice2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["profilePhoto"], "https://cdn.example/alice.png");
    assert_eq!(body["username"], "alice2");

    let res = alice
        .client
        .put(server.url(&format!("/api/v1/users/{}", bob.id)))
        .json(&json!({ "profilePhoto": "https://cdn.example/x.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = alice
        .client
        .delete(server.url(&format!("/api/v1/users/{}", bob.id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn own_id_is_accepted_in_any_letter_case() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let upper = alice.id.to_string().to_uppercase();

    let res = alice
        .client
        .put(server.url(&format!("/api/v1/users/{}", upper)))
        .json(&json!({ "profilePhoto": "https://cdn.example/alice.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["id"], alice.id.to_string());

    let res = alice
        .client
        .put(server.url("/api/v1/users/not-a-uuid"))
        .json(&json!({ "profilePhoto": "https://cdn.example/alice.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn renaming_onto_taken_username_fails() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    server.signup("bob", "secret1").await?;

    let res = alice
        .client
        .put(server.url(&format!("/api/v1/users/{}", alice.id)))
        .json(&json!({ "username": "BOB" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn role_changes_require_admin() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let root = server.signup("root", "secret1").await?;
    server.promote(root.id).await?;

    let res = alice
        .client
        .put(server.url(&format!("/api/v1/users/{}", alice.id)))
        .json(&json!({ "role": "admin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = root
        .client
        .put(server.url(&format!("/api/v1/users/{}", alice.id)))
        .json(&json!({ "role": "admin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Identity is re-read per request, so the existing session sees the new role.
    let res = alice.client.get(server.url("/api/v1/users")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn restating_own_role_is_accepted() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;

    let res = alice
        .client
        .put(server.url(&format!("/api/v1/users/{}", alice.id)))
        .json(&json!({ "role": "user", "profilePhoto": "https://cdn.example/alice.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["role"], "user");
    Ok(())
}

#[tokio::test]
async fn null_profile_photo_clears_it() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let url = server.url(&format!("/api/v1/users/{}", alice.id));

    let res = alice
        .client
        .put(&url)
        .json(&json!({ "profilePhoto": "https://cdn.example/alice.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = alice.client.put(&url).json(&json!({ "profilePhoto": null })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert!(body["profilePhoto"].is_null());
    Ok(())
}

#[tokio::test]
async fn startup_admin_can_list_users() -> Result<()> {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    config.security.bootstrap_admin = Some(AdminCredentials {
        username: "root".to_string(),
        password: "secret1".to_string(),
    });
    let server = spawn_with(config).await?;
    server.signup("alice", "secret1").await?;

    let root = server.signin("root", "secret1").await?;
    let res = root.client.get(server.url("/api/v1/users")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn listing_users_is_admin_only() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let root = server.signup("root", "secret1").await?;
    server.promote(root.id).await?;

    let res = alice.client.get(server.url("/api/v1/users")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Only admin is allowed for this request");

    let res = root.client.get(server.url("/api/v1/users/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn admin_may_delete_any_account() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let root = server.signup("root", "secret1").await?;
    server.promote(root.id).await?;

    let res = root
        .client
        .delete(server.url(&format!("/api/v1/users/{}", alice.id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["username"], "alice");

    let res = root
        .client
        .delete(server.url(&format!("/api/v1/users/{}", alice.id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn subscription_round_trip_updates_both_sides() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let bob = server.signup("bob", "secret1").await?;
    let sub_url = server.url(&format!("/api/v1/users/sub/{}", bob.id));

    for _ in 0..2 {
        let res = alice.client.patch(&sub_url).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["message"], "Subscribed successfully!");
    }

    let a: Value = reqwest::get(server.url(&format!("/api/v1/users/find/{}", alice.id))).await?.json().await?;
    let b: Value = reqwest::get(server.url(&format!("/api/v1/users/find/{}", bob.id))).await?.json().await?;
    assert_eq!(a["subscribedUsers"], json!([bob.id]));
    assert_eq!(b["subscribers"], json!([alice.id]));

    let res = alice
        .client
        .patch(server.url(&format!("/api/v1/users/unsub/{}", bob.id)))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Unsubscribed successfully!");

    let a: Value = reqwest::get(server.url(&format!("/api/v1/users/find/{}", alice.id))).await?.json().await?;
    let b: Value = reqwest::get(server.url(&format!("/api/v1/users/find/{}", bob.id))).await?.json().await?;
    assert_eq!(a["subscribedUsers"], json!([]));
    assert_eq!(b["subscribers"], json!([]));
    Ok(())
}

#[tokio::test]
async fn subscribing_requires_identity_and_a_real_target() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;

    let res = reqwest::Client::new()
        .patch(server.url(&format!("/api/v1/users/sub/{}", alice.id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = alice
        .client
        .patch(server.url(&format!("/api/v1/users/sub/{}", alice.id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = alice
        .client
        .patch(server.url(&format!("/api/v1/users/sub/{}", uuid::Uuid::new_v4())))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn like_and_dislike_swap_membership() -> Result<()> {
    let server = spawn_app().await?;
    let alice = server.signup("alice", "secret1").await?;
    let bob = server.signup("bob", "secret1").await?;
    let video = server.upload(&alice, "clip", &[]).await?;
    let video_id = video["id"].as_str().unwrap_or_default().to_string();

    let res = bob
        .client
        .patch(server.url(&format!("/api/v1/users/like/{}", video_id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["likes"], json!([bob.id]));
    assert_eq!(body["dislikes"], json!([]));

    let res = bob
        .client
        .patch(server.url(&format!("/api/v1/users/dislike/{}", video_id)))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["likes"], json!([]));
    assert_eq!(body["dislikes"], json!([bob.id]));

    let res = bob
        .client
        .patch(server.url(&format!("/api/v1/users/like/{}", uuid::Uuid::new_v4())))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
