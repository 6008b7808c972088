//! Approve or complete a user-initiated payment.
//!
//! The client SDK calls this endpoint twice per payment: once when the
//! payment is ready for server approval and once with the blockchain
//! transaction id when it is ready for completion.

use axum::{extract::State, Json};
use bytes::Bytes;
use pibridge_core::{ActionRequest, ActionResponse, PaymentCommand};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn, Span};

use crate::{
    error::{ApiError, Flow},
    extract, AppState,
};

/// Performs one provider call chosen by the body's `action`.
///
/// # Errors
///
/// - 400 `Invalid JSON body` when the body does not negotiate to an object
/// - 400 `Missing action or paymentId`
/// - 500 `PI_API_KEY not configured`
/// - 400 `Missing txid for completion` / `Unknown action`
/// - 502 `Approve failed` / `Complete failed` with the provider's raw text
/// - 500 `Backend exception` when the provider could not be reached
#[instrument(
    name = "payment_action",
    skip_all,
    fields(action = tracing::field::Empty, payment_id = tracing::field::Empty)
)]
pub async fn handle_payment_action(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    debug!(body = %String::from_utf8_lossy(&body), "Received payment action");

    let request = extract::negotiate_object(&body)
        .and_then(|object| ActionRequest::from_object(&object))
        .map_err(|e| {
            warn!(reason = %e, "Rejected payment action");
            ApiError::from(e)
        })?;

    let span = Span::current();
    span.record("action", request.action.as_str());
    span.record("payment_id", request.payment_id.as_str());

    let Some(api_key) = state.config.api_key.as_ref() else {
        warn!("Payment action refused, no provider credential configured");
        return Err(ApiError::ConfigurationError { flow: Flow::PaymentAction });
    };

    let command = request.command().map_err(|e| {
        warn!(reason = %e, "Rejected payment action");
        ApiError::from(e)
    })?;

    let result = match &command {
        PaymentCommand::Approve => state.provider.approve_payment(api_key, &request.payment_id).await,
        PaymentCommand::Complete { txid } => {
            state.provider.complete_payment(api_key, &request.payment_id, Some(txid)).await
        },
    };

    let response = result.map_err(|e| {
        error!(error = %e, "Provider call failed");
        ApiError::backend(Flow::PaymentAction, e.to_string())
    })?;

    if !response.is_success {
        error!(
            step = %command.step(),
            status = response.status_code,
            details = %response.body,
            "Provider rejected payment action"
        );
        return Err(ApiError::UpstreamCallFailed {
            flow: Flow::PaymentAction,
            step: command.step(),
            status_code: response.status_code,
            details: Value::String(response.body),
        });
    }

    info!(stage = ?command.stage(), "Payment action succeeded");
    Ok(Json(ActionResponse::reached(command.stage())))
}
