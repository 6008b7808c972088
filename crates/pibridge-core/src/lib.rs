//! Core domain types for the Pi payment proxy.
//!
//! Provides strongly-typed primitives for credentials, payment identifiers and
//! amounts, the request/response models exchanged with callers and with the
//! provider, and the validation errors raised while decoding caller input.
//! Every other crate in the workspace builds on these types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod time;

pub use error::{Result, ValidationError};
pub use models::{
    A2uResponse, ActionRequest, ActionResponse, Amount, ApiKey, ExternalPayment, NewPayment,
    PaymentCommand, PaymentId, PaymentMetadata, PaymentRequest, PaymentStage, PaymentStep,
};
pub use time::{Clock, RealClock, TestClock};
