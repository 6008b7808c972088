//! App-to-User transfer handler.
//!
//! Sends Pi from the application wallet to a user by creating, approving and
//! completing a payment in one request. Nothing is persisted: if a step fails
//! the payment is left wherever the provider has it, and retrying the request
//! creates a new one.

use axum::{extract::State, Json};
use bytes::Bytes;
use pibridge_client::lifecycle;
use pibridge_core::{A2uResponse, NewPayment, PaymentRequest};
use tracing::{field, info, instrument, warn, Span};

use crate::{
    error::{ApiError, Flow},
    extract, AppState,
};

/// Runs the create → approve → complete sequence for a validated request.
///
/// # Errors
///
/// - 500 `Missing PI_API_KEY` when no credential is configured
/// - 400 `Invalid uid` / `Invalid amount` for a bad body
/// - 500 `Create failed` / `Approve failed` / `Complete failed` when the
///   provider rejects a step
/// - 500 `A2U exception` for network failures and malformed provider answers
#[instrument(
    name = "a2u_payment",
    skip_all,
    fields(uid = field::Empty, amount = field::Empty, payment_id = field::Empty)
)]
pub async fn create_a2u_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<A2uResponse>, ApiError> {
    let Some(api_key) = state.config.api_key.as_ref() else {
        warn!("A2U request refused, no provider credential configured");
        return Err(ApiError::ConfigurationError { flow: Flow::A2u });
    };

    let request = PaymentRequest::from_value(&extract::lenient_json(&body)).map_err(|e| {
        warn!(reason = %e, "Rejected A2U request");
        ApiError::from(e)
    })?;

    let span = Span::current();
    span.record("uid", request.uid.as_str());
    span.record("amount", request.amount.value());
    info!("Starting A2U payment");

    let payment = NewPayment::a2u(
        &request,
        state.config.a2u_memo.as_str(),
        state.config.a2u_metadata_type.as_str(),
        state.clock.unix_millis(),
    );

    let completed = lifecycle::run_a2u(state.provider.as_ref(), api_key, &payment)
        .await
        .map_err(ApiError::from_lifecycle)?;

    span.record("payment_id", completed.payment_id.as_str());
    info!("A2U payment completed");

    Ok(Json(A2uResponse {
        ok: true,
        uid: request.uid,
        amount: request.amount,
        payment_id: completed.payment_id,
        status: completed.payment.status,
    }))
}
