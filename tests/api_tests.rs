//! Integration tests for the fitradar API surface
//!
//! The memory store is pointed at an unreachable address, so these tests
//! exercise the degradation policy end to end: read endpoints answer with
//! empty/default bodies, write endpoints report `success: false`, and only
//! malformed requests earn a 400.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use fitradar::{build_router, AppState, Config};

/// Test app wired to an unreachable memory store and no email key.
fn create_test_app() -> axum::Router {
    let config = Config {
        memory_server_url: "http://127.0.0.1:1".to_string(),
        feeds: Vec::new(),
        resend_api_key: None,
        ..Config::default()
    };
    let state = AppState::from_config(config).expect("test app state");
    build_router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn root_and_health_respond() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "running");

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "fitradar");
}

#[tokio::test]
async fn polling_status_starts_stopped() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::get("/api/polling-status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"]["is_running"], false);
    assert_eq!(body["status"]["processed_products_count"], 0);
    assert!(body["status"]["last_poll_time"].is_null());
}

#[tokio::test]
async fn malformed_feedback_verdict_is_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/user/u@example.com/feedback",
            json!({"product_id": "p1", "feedback": "maybe"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn feedback_with_unreachable_store_reports_failure() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/user/u@example.com/feedback",
            json!({"product_id": "p1", "feedback": "good"}),
        ))
        .await
        .unwrap();

    // Validation passed; the store write failed, degrading to success=false
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_user_gets_default_preferences() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::get("/api/user/new@example.com/preferences")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["preferences"]["email"], "new@example.com");
    assert_eq!(body["preferences"]["notification_frequency"], "weekly");
    assert_eq!(body["preferences"]["liked_product_ids"], json!([]));
}

#[tokio::test]
async fn matches_degrade_to_empty_list() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::get("/api/user/u@example.com/matches?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert_eq!(body["matches"], json!([]));
}

#[tokio::test]
async fn products_listing_degrades_to_empty_list() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::get("/api/products").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn store_products_counts_failures_out() {
    let app = create_test_app();

    let product = json!({
        "id": "abc123",
        "name": "Air Max 2024",
        "description": "Bold runners",
        "brand": "Nike",
        "image_url": "https://cdn.x.com/a.jpg",
        "product_url": "https://x.com/a"
    });

    let response = app
        .oneshot(json_request("POST", "/api/store-products", json!([product])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    // Store unreachable: the item fails and is counted out, not escalated
    assert_eq!(body["stored"], 0);
}

#[tokio::test]
async fn subscribe_reports_store_failure() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/subscribe",
            json!({"email": "u@example.com", "notification_frequency": "daily"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["email"], "u@example.com");
}
