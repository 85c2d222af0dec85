mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_redirect_success() {
    let (server, _) = common::create_test_server();

    server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/target", "custom_slug": "go-to" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/go-to").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_tracks_access() {
    let (server, repository) = common::create_test_server();

    server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "custom_slug": "counted" }))
        .await;

    for _ in 0..3 {
        server.get("/counted").await.assert_status(StatusCode::FOUND);
    }

    let body = server.get("/api/links/counted").await.json::<Value>();
    assert_eq!(body["access_count"], 3);
    assert!(body["last_accessed_at"].is_string());
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (server, _) = common::create_test_server();

    let response = server.get("/nothing-here").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_slug_too_long() {
    let (server, _) = common::create_test_server();

    let response = server.get(&format!("/{}", "a".repeat(65))).await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "invalid_slug");
}

#[tokio::test]
async fn test_redirect_deleted_link() {
    let (server, _) = common::create_test_server();

    server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "custom_slug": "gone" }))
        .await;
    server.delete("/api/links/gone").await;

    server.get("/gone").await.assert_status_not_found();
}
