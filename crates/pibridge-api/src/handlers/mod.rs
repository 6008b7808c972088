//! HTTP request handlers for the payment proxy.
//!
//! Handlers are grouped by functionality:
//! - `a2u` - App-to-User transfers (create, approve, complete in one call)
//! - `payment_action` - single approve or complete for user-initiated payments
//! - `health` - health, readiness and liveness probes
//!
//! Payment handlers return `Result<Json<_>, ApiError>`; the error type turns
//! every failure into the endpoint's status code and JSON body.

use axum::http::Method;
use tracing::warn;

use crate::error::ApiError;

pub mod a2u;
pub mod health;
pub mod payment_action;

pub use a2u::create_a2u_payment;
pub use health::{health_check, liveness_check, readiness_check};
pub use payment_action::handle_payment_action;

/// Fallback for payment routes hit with a method other than POST.
pub async fn method_not_allowed(method: Method) -> ApiError {
    warn!(%method, "Rejected non-POST request");
    ApiError::MethodNotAllowed
}
