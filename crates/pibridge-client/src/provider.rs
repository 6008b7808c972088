//! Seam between the HTTP handlers and the payment provider.
//!
//! Handlers and the lifecycle state machine depend on [`PaymentProvider`]
//! rather than on the concrete reqwest client, so tests can substitute a
//! scripted provider without a network.

use std::time::Duration;

use async_trait::async_trait;
use pibridge_core::{ApiKey, NewPayment, PaymentId};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Provider payments API.
///
/// Each method performs exactly one HTTP call and returns whatever the
/// provider answered, successful or not. Errors are reserved for calls that
/// produced no usable response.
#[async_trait]
pub trait PaymentProvider: Send + Sync + std::fmt::Debug {
    /// `POST payments`
    async fn create_payment(
        &self,
        api_key: &ApiKey,
        payment: &NewPayment,
    ) -> Result<ProviderResponse>;

    /// `POST payments/{id}/approve`, without a body.
    async fn approve_payment(
        &self,
        api_key: &ApiKey,
        payment_id: &PaymentId,
    ) -> Result<ProviderResponse>;

    /// `POST payments/{id}/complete`, with `{txid}` when one is given.
    async fn complete_payment(
        &self,
        api_key: &ApiKey,
        payment_id: &PaymentId,
        txid: Option<&str>,
    ) -> Result<ProviderResponse>;
}

/// Raw provider answer.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body as text.
    pub body: String,
    /// Time from sending the request to reading the body.
    pub duration: Duration,
    /// Whether the status was 2xx.
    pub is_success: bool,
}

impl ProviderResponse {
    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidResponse` when the body is not JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| {
            ClientError::invalid_response(format!(
                "HTTP {} body is not valid JSON: {e}",
                self.status_code
            ))
        })
    }

    /// Body for error reports: parsed JSON when possible, the raw text
    /// otherwise.
    pub fn details(&self) -> Value {
        self.json().unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}
