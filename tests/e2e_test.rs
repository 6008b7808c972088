//! End-to-end tests over a real socket.
//!
//! The service is assembled the way the binary assembles it, from a
//! [`Config`], and driven with reqwest against a mock provider.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use pibridge_api::{create_router, AppState, Config};
use pibridge_client::PiClient;
use pibridge_core::{ApiKey, RealClock};
use pibridge_testing::{fixtures, MockPi};
use serde_json::{json, Value};

async fn spawn_service(base_url: String, api_key: Option<&str>) -> SocketAddr {
    pibridge_testing::init_tracing();

    let config = Config {
        pi_api_key: api_key.and_then(ApiKey::new),
        pi_api_base_url: base_url,
        provider_timeout_seconds: Some(5),
        ..Config::default()
    };

    let client = PiClient::new(config.to_client_config()).expect("client builds");
    let state = AppState::new(config.to_payments_config(), Arc::new(client), Arc::new(RealClock));
    let app = create_router(state, Duration::from_secs(10));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });
    addr
}

#[tokio::test]
async fn a2u_and_user_payment_actions_over_http() {
    let pi = MockPi::start().await;
    pi.a2u_succeeds("P-A2U", json!({"developer_completed": true})).await;
    pi.approve_succeeds("P-USER").await;
    pi.complete_succeeds("P-USER", json!("completed")).await;

    let addr = spawn_service(pi.base_url(), Some(fixtures::TEST_API_KEY)).await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("http://{addr}/a2u"))
        .json(&fixtures::a2u_body("pioneer", 2.5))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "ok": true,
            "uid": "pioneer",
            "amount": 2.5,
            "paymentId": "P-A2U",
            "status": {"developer_completed": true}
        })
    );

    let approve = http
        .post(format!("http://{addr}/pi-payment"))
        .json(&fixtures::approve_body("P-USER"))
        .send()
        .await
        .unwrap();
    assert_eq!(approve.status(), 200);
    assert_eq!(approve.json::<Value>().await.unwrap(), json!({"ok": true, "stage": "approved"}));

    let complete = http
        .post(format!("http://{addr}/pi-payment"))
        .json(&fixtures::complete_body("P-USER", "tx-9"))
        .send()
        .await
        .unwrap();
    assert_eq!(complete.status(), 200);
    assert_eq!(complete.json::<Value>().await.unwrap(), json!({"ok": true, "stage": "completed"}));

    assert_eq!(pi.received().await.len(), 5);
}

#[tokio::test]
async fn unconfigured_service_reports_degraded_and_refuses_payments() {
    let pi = MockPi::start().await;
    let addr = spawn_service(pi.base_url(), None).await;
    let http = reqwest::Client::new();

    let ready = http.get(format!("http://{addr}/ready")).send().await.unwrap();
    assert_eq!(ready.status(), 503);

    let a2u = http
        .post(format!("http://{addr}/a2u"))
        .json(&fixtures::a2u_body("pioneer", 1))
        .send()
        .await
        .unwrap();
    assert_eq!(a2u.status(), 500);
    assert_eq!(a2u.json::<Value>().await.unwrap(), json!({"error": "Missing PI_API_KEY"}));

    assert!(pi.received().await.is_empty());
}

#[tokio::test]
async fn unreachable_provider_is_a_backend_exception() {
    let addr =
        spawn_service("http://127.0.0.1:9/v2/".to_string(), Some(fixtures::TEST_API_KEY)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/pi-payment"))
        .json(&fixtures::approve_body("P1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Backend exception");
    assert!(body["message"].as_str().unwrap().contains("network request failed"));
}
