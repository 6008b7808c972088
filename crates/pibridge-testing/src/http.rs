//! Provider mocking for payment tests.

use pibridge_client::{ClientConfig, PiClient};
use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

use crate::fixtures::expected_authorization;

/// Wiremock server answering on the provider's `/v2/payments` routes.
///
/// Every helper mounts a POST mock that also requires the test credential,
/// so a request without `Authorization: Key test-pi-key` matches nothing and
/// gets wiremock's default 404.
pub struct MockPi {
    server: MockServer,
}

impl MockPi {
    /// Starts a new mock provider on a random port.
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Base URL to configure the client with.
    pub fn base_url(&self) -> String {
        format!("{}/v2/", self.server.uri())
    }

    /// Client pointed at this mock.
    pub fn client(&self) -> PiClient {
        PiClient::new(ClientConfig { base_url: self.base_url(), ..ClientConfig::default() })
            .expect("mock base URL is valid")
    }

    /// Underlying wiremock server, for one-off mocks.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    fn post(route: &str) -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(route))
            .and(header("authorization", expected_authorization().as_str()))
    }

    /// Create answers with `identifier` on every call.
    pub async fn create_succeeds(&self, identifier: &str) {
        Self::post("/v2/payments")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"identifier": identifier})))
            .mount(&self.server)
            .await;
    }

    /// Create answers with `identifier` exactly once.
    pub async fn create_succeeds_once(&self, identifier: &str) {
        Self::post("/v2/payments")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"identifier": identifier})))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Create answers 2xx with a body of the caller's choosing.
    pub async fn create_answers(&self, body: Value) {
        Self::post("/v2/payments")
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Create fails with `status` and a raw text body.
    pub async fn create_fails(&self, status: u16, body: &str) {
        Self::post("/v2/payments")
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Approve of `payment_id` succeeds.
    pub async fn approve_succeeds(&self, payment_id: &str) {
        Self::post(&format!("/v2/payments/{payment_id}/approve"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"identifier": payment_id})),
            )
            .mount(&self.server)
            .await;
    }

    /// Approve of `payment_id` fails with `status` and a raw text body.
    pub async fn approve_fails(&self, payment_id: &str, status: u16, body: &str) {
        Self::post(&format!("/v2/payments/{payment_id}/approve"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Complete of `payment_id` succeeds, reporting `status`.
    pub async fn complete_succeeds(&self, payment_id: &str, status: Value) {
        Self::post(&format!("/v2/payments/{payment_id}/complete"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"identifier": payment_id, "status": status})),
            )
            .mount(&self.server)
            .await;
    }

    /// Complete of `payment_id` fails with `status` and a raw text body.
    pub async fn complete_fails(&self, payment_id: &str, status: u16, body: &str) {
        Self::post(&format!("/v2/payments/{payment_id}/complete"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts create, approve and complete for one successful A2U run.
    pub async fn a2u_succeeds(&self, payment_id: &str, status: Value) {
        self.create_succeeds(payment_id).await;
        self.approve_succeeds(payment_id).await;
        self.complete_succeeds(payment_id, status).await;
    }

    /// All requests received so far.
    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of requests received on `route`.
    pub async fn requests_to(&self, route: &str) -> usize {
        self.received().await.iter().filter(|request| request.url.path() == route).count()
    }

    /// Asserts that exactly `expected` requests reached `route`.
    pub async fn assert_requests_to(&self, route: &str, expected: usize) {
        let actual = self.requests_to(route).await;
        assert_eq!(actual, expected, "Expected {expected} requests to {route}, received {actual}");
    }
}
