//! HTTP client for the Pi Network payments API.
//!
//! Builds provider URLs, attaches the `Key` credential header, and turns
//! transport failures into categorized [`ClientError`]s. Provider answers are
//! returned unchanged as [`ProviderResponse`]s so each caller can apply its
//! own success criteria.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pibridge_core::{ApiKey, NewPayment, PaymentId};
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    RequestBuilder,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::{
    error::{ClientError, Result},
    provider::{PaymentProvider, ProviderResponse},
};

/// Production base URL of the payments API.
pub const DEFAULT_BASE_URL: &str = "https://api.minepi.com/v2/";

/// Configuration for the provider client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL; `payments/...` paths are appended to it.
    pub base_url: String,
    /// Request timeout. `None` keeps reqwest's default of no timeout.
    pub timeout: Option<Duration>,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: concat!("pibridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Client for the provider's payments endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PiClient {
    client: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    txid: &'a str,
}

impl PiClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ConfigurationError` if the base URL does not
    /// parse, cannot carry path segments, or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::configuration(format!("invalid base URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::configuration(format!(
                "base URL {} cannot carry paths",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url, config })
    }

    /// Creates a client for the production API with default settings.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Base URL requests are sent under.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::configuration("base URL cannot carry paths"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, url: Url, api_key: &ApiKey) -> RequestBuilder {
        self.client
            .post(url)
            .header(AUTHORIZATION, api_key.authorization())
            .header(CONTENT_TYPE, "application/json")
    }

    /// Sends a request and reads the full response body.
    async fn send(&self, request: RequestBuilder) -> Result<ProviderResponse> {
        let start_time = Instant::now();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let duration = start_time.elapsed();
                tracing::warn!(duration_ms = duration.as_millis(), "Provider request failed: {}", e);

                if e.is_timeout() {
                    let timeout_seconds = self.config.timeout.map_or(0, |t| t.as_secs());
                    return Err(ClientError::timeout(timeout_seconds));
                }
                if e.is_connect() {
                    return Err(ClientError::network(format!("connection failed: {e}")));
                }
                return Err(ClientError::network(e.to_string()));
            },
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::network(format!("failed to read response body: {e}")))?;
        let duration = start_time.elapsed();

        if status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                duration_ms = duration.as_millis(),
                "Provider accepted request"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                duration_ms = duration.as_millis(),
                "Provider rejected request"
            );
        }

        Ok(ProviderResponse {
            status_code: status.as_u16(),
            body,
            duration,
            is_success: status.is_success(),
        })
    }
}

#[async_trait]
impl PaymentProvider for PiClient {
    #[instrument(name = "provider_create", skip_all, fields(uid = %payment.uid, amount = %payment.amount))]
    async fn create_payment(
        &self,
        api_key: &ApiKey,
        payment: &NewPayment,
    ) -> Result<ProviderResponse> {
        let url = self.endpoint(&["payments"])?;
        self.send(self.authorized(url, api_key).json(payment)).await
    }

    #[instrument(name = "provider_approve", skip_all, fields(payment_id = %payment_id))]
    async fn approve_payment(
        &self,
        api_key: &ApiKey,
        payment_id: &PaymentId,
    ) -> Result<ProviderResponse> {
        let url = self.endpoint(&["payments", payment_id.as_str(), "approve"])?;
        self.send(self.authorized(url, api_key)).await
    }

    #[instrument(name = "provider_complete", skip_all, fields(payment_id = %payment_id, with_txid = txid.is_some()))]
    async fn complete_payment(
        &self,
        api_key: &ApiKey,
        payment_id: &PaymentId,
        txid: Option<&str>,
    ) -> Result<ProviderResponse> {
        let url = self.endpoint(&["payments", payment_id.as_str(), "complete"])?;
        let mut request = self.authorized(url, api_key);
        if let Some(txid) = txid {
            request = request.json(&CompletionBody { txid });
        }
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use pibridge_core::{Amount, PaymentRequest};
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> PiClient {
        PiClient::new(ClientConfig {
            base_url: format!("{}/v2/", server.uri()),
            ..Default::default()
        })
        .unwrap()
    }

    fn key() -> ApiKey {
        ApiKey::new("test-key").unwrap()
    }

    #[test]
    fn endpoint_handles_trailing_slash_and_encodes_segments() {
        let with_slash = PiClient::with_defaults().unwrap();
        let url = with_slash.endpoint(&["payments", "a/b c", "approve"]).unwrap();
        assert_eq!(url.as_str(), "https://api.minepi.com/v2/payments/a%2Fb%20c/approve");

        let without_slash = PiClient::new(ClientConfig {
            base_url: "https://api.minepi.com/v2".to_string(),
            ..Default::default()
        })
        .unwrap();
        let url = without_slash.endpoint(&["payments"]).unwrap();
        assert_eq!(url.as_str(), "https://api.minepi.com/v2/payments");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let err = PiClient::new(ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::ConfigurationError { .. }));

        let err = PiClient::new(ClientConfig {
            base_url: "mailto:ops@example.com".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::ConfigurationError { .. }));
    }

    #[tokio::test]
    async fn create_sends_credential_and_body() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v2/payments"))
            .and(matchers::header("authorization", "Key test-key"))
            .and(matchers::header("content-type", "application/json"))
            .and(matchers::body_partial_json(json!({"uid": "user-1", "amount": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"identifier": "P1"})))
            .expect(1)
            .mount(&server)
            .await;

        let request = PaymentRequest { uid: "user-1".into(), amount: Amount::new(2.0).unwrap() };
        let payment = NewPayment::a2u(&request, "memo", "a2u-testnet", 0);

        let response = client_for(&server).create_payment(&key(), &payment).await.unwrap();

        assert!(response.is_success);
        assert_eq!(response.json().unwrap(), json!({"identifier": "P1"}));
    }

    #[tokio::test]
    async fn approve_sends_no_body() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v2/payments/P1/approve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"identifier": "P1"})))
            .expect(1)
            .mount(&server)
            .await;

        let payment_id = PaymentId::new("P1").unwrap();
        let response = client_for(&server).approve_payment(&key(), &payment_id).await.unwrap();
        assert!(response.is_success);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].body.is_empty());
    }

    #[tokio::test]
    async fn complete_forwards_txid_when_given() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v2/payments/P1/complete"))
            .and(matchers::body_json(json!({"txid": "tx-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "done"})))
            .expect(1)
            .mount(&server)
            .await;

        let payment_id = PaymentId::new("P1").unwrap();
        let response = client_for(&server)
            .complete_payment(&key(), &payment_id, Some("tx-1"))
            .await
            .unwrap();

        assert!(response.is_success);
    }

    #[tokio::test]
    async fn non_success_is_returned_not_raised() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("payment not found"))
            .mount(&server)
            .await;

        let payment_id = PaymentId::new("missing").unwrap();
        let response = client_for(&server).approve_payment(&key(), &payment_id).await.unwrap();

        assert_eq!(response.status_code, 404);
        assert!(!response.is_success);
        assert_eq!(response.body, "payment not found");
    }
}
