//! Validation errors raised while decoding caller requests.
//!
//! The `Display` text of each variant is the exact message returned to the
//! caller in the `error` field, so changing a message is a contract change.

use thiserror::Error;

/// Result type alias using `ValidationError`.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Reasons a caller request is rejected before any provider call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `uid` is missing, not a string, or empty.
    #[error("Invalid uid")]
    InvalidUid,

    /// `amount` does not coerce to a finite number greater than zero.
    #[error("Invalid amount")]
    InvalidAmount,

    /// The body could not be negotiated into a JSON object.
    #[error("Invalid JSON body")]
    InvalidJsonBody,

    /// `action` or `paymentId` is absent.
    #[error("Missing action or paymentId")]
    MissingActionOrPaymentId,

    /// `action` is `complete` but no `txid` was supplied.
    #[error("Missing txid for completion")]
    MissingTxid,

    /// `action` is neither `approve` nor `complete`.
    #[error("Unknown action")]
    UnknownAction,
}
