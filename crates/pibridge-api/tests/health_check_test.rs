//! Integration tests for the health, readiness and liveness probes.

use axum::http::{Method, StatusCode};
use pibridge_testing::TestApp;
use serde_json::json;

#[tokio::test]
async fn health_is_healthy_with_credential() {
    let app = TestApp::start().await;

    let response = app.request(Method::GET, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["checks"]["credential"], json!({"status": "up"}));
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(response.body["timestamp"], "2023-11-14T22:13:20Z");
}

#[tokio::test]
async fn health_is_degraded_without_credential() {
    let app = TestApp::without_credential().await;

    let response = app.request(Method::GET, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["checks"]["credential"]["status"], "down");
    assert_eq!(
        response.body["checks"]["credential"]["message"],
        "PI_API_KEY is not configured"
    );
}

#[tokio::test]
async fn readiness_follows_credential() {
    let ready = TestApp::start().await.request(Method::GET, "/ready").await;
    assert_eq!(ready.status, StatusCode::OK);

    let not_ready = TestApp::without_credential().await.request(Method::GET, "/ready").await;
    assert_eq!(not_ready.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(not_ready.body["status"], "degraded");
}

#[tokio::test]
async fn liveness_ignores_configuration() {
    let app = TestApp::without_credential().await;

    let response = app.request(Method::GET, "/live").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "alive");
    assert_eq!(response.body["service"], "pibridge");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = TestApp::start().await;

    let response = app.request(Method::GET, "/payments").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
