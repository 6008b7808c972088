//! Drives the real router in-process.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use pibridge_api::{create_router, server::DEFAULT_REQUEST_TIMEOUT, AppState, PaymentsConfig};
use pibridge_core::{ApiKey, TestClock};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    fixtures::{FIXED_TIME_MILLIS, TEST_API_KEY},
    http::MockPi,
};

/// Router wired to a [`MockPi`] provider and a fixed clock.
pub struct TestApp {
    router: Router,
    /// Provider the router talks to
    pub pi: MockPi,
    /// Clock injected into the router
    pub clock: TestClock,
}

/// Response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body parsed as JSON, `Value::Null` when it is not JSON
    pub body: Value,
}

impl TestApp {
    /// App with the test credential configured.
    pub async fn start() -> Self {
        let key = ApiKey::new(TEST_API_KEY);
        Self::with_config(PaymentsConfig::with_api_key(key)).await
    }

    /// App running without a provider credential.
    pub async fn without_credential() -> Self {
        Self::with_config(PaymentsConfig::with_api_key(None)).await
    }

    /// App with explicit payment settings.
    pub async fn with_config(config: PaymentsConfig) -> Self {
        Self::build(config, DEFAULT_REQUEST_TIMEOUT).await
    }

    /// App with the test credential and a custom inbound request timeout.
    pub async fn with_request_timeout(request_timeout: Duration) -> Self {
        let key = ApiKey::new(TEST_API_KEY);
        Self::build(PaymentsConfig::with_api_key(key), request_timeout).await
    }

    async fn build(config: PaymentsConfig, request_timeout: Duration) -> Self {
        crate::init_tracing();

        let pi = MockPi::start().await;
        let clock = TestClock::at_unix_millis(FIXED_TIME_MILLIS);
        let state = AppState::new(config, Arc::new(pi.client()), Arc::new(clock.clone()));

        Self { router: create_router(state, request_timeout), pi, clock }
    }

    /// POSTs a JSON value.
    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.post_raw(uri, body.to_string()).await
    }

    /// POSTs raw bytes labelled as JSON.
    pub async fn post_raw(&self, uri: &str, body: impl Into<Body>) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("valid request");
        self.send(request).await
    }

    /// Sends a body-less request with any method.
    pub async fn request(&self, method: Method, uri: &str) -> TestResponse {
        let request =
            Request::builder().method(method).uri(uri).body(Body::empty()).expect("valid request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body is readable");

        TestResponse { status, headers, body: serde_json::from_slice(&bytes).unwrap_or(Value::Null) }
    }
}
