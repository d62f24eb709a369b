mod helpers;

use axum::http::StatusCode;
use helpers::setup_test_app;
use tubely_core::models::VideoRecord;
use uuid::Uuid;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;
    let response = app.client.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_video() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();

    let response = app
        .client
        .post("/api/videos")
        .add_header("Authorization", format!("Bearer {}", app.token_for(owner)))
        .json(&serde_json::json!({ "title": "  Boots  ", "description": "leather" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: VideoRecord = response.json();
    assert_eq!(created.title, "Boots");
    assert_eq!(created.description, "leather");
    assert_eq!(created.user_id, owner);
    assert!(created.video_url.is_none());

    // Public read, no token
    let response = app.client.get(&format!("/api/videos/{}", created.id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let fetched: VideoRecord = response.json();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_requires_title_and_token() {
    let app = setup_test_app().await;
    let token = app.token_for(Uuid::new_v4());

    let response = app
        .client
        .post("/api/videos")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "title": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .client
        .post("/api/videos")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "description": "no title" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");

    let response = app
        .client
        .post("/api/videos")
        .json(&serde_json::json!({ "title": "Boots" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_returns_only_callers_videos() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let first = app.create_video(alice, "First").await;
    let second = app.create_video(alice, "Second").await;
    app.create_video(bob, "Bob's").await;

    let response = app
        .client
        .get("/api/videos")
        .add_header("Authorization", format!("Bearer {}", app.token_for(alice)))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let videos: Vec<VideoRecord> = response.json();
    let ids: Vec<Uuid> = videos.iter().map(|v| v.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first));
    assert!(ids.contains(&second));
    assert!(videos.iter().all(|v| v.user_id == alice));
}

#[tokio::test]
async fn test_get_missing_video() {
    let app = setup_test_app().await;

    let response = app.client.get(&format!("/api/videos/{}", Uuid::new_v4())).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.client.get("/api/videos/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_owner_only() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video_id = app.create_video(owner, "Boots").await;

    let response = app
        .client
        .delete(&format!("/api/videos/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", app.token_for(Uuid::new_v4())))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app.client.get(&format!("/api/videos/{}", video_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .client
        .delete(&format!("/api/videos/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", app.token_for(owner)))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app.client.get(&format!("/api/videos/{}", video_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
