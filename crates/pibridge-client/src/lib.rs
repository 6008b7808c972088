//! Client for the Pi Network payments API.
//!
//! This crate talks to the provider on behalf of the HTTP handlers:
//!
//! 1. **[`PiClient`]** - reqwest client that builds provider URLs, attaches the
//!    `Authorization: Key <credential>` header and categorizes transport
//!    failures.
//! 2. **[`PaymentProvider`]** - trait seam the handlers depend on, implemented
//!    by `PiClient` and by test doubles.
//! 3. **[`lifecycle`]** - the App-to-User `Created → Approved → Completed`
//!    state machine.
//!
//! No call is ever retried. A failure at any step is final for that request.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod lifecycle;
pub mod provider;

pub use client::{ClientConfig, PiClient, DEFAULT_BASE_URL};
pub use error::{ClientError, Result};
pub use lifecycle::LifecycleError;
pub use provider::{PaymentProvider, ProviderResponse};
