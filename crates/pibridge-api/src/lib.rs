//! HTTP surface of the Pi payment proxy.
//!
//! Exposes two stateless payment endpoints, `POST /a2u` and
//! `POST /pi-payment`, plus health probes. Handlers receive an [`AppState`]
//! holding the configuration, the provider client and a clock; nothing else
//! is shared between requests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use pibridge_client::PaymentProvider;
use pibridge_core::Clock;

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use config::{Config, PaymentsConfig};
pub use error::{ApiError, Flow};
pub use server::{create_router, start_server};

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Credential and A2U payment settings
    pub config: Arc<PaymentsConfig>,
    /// Provider payments API
    pub provider: Arc<dyn PaymentProvider>,
    /// Clock used to timestamp payments and health responses
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates application state.
    pub fn new(
        config: PaymentsConfig,
        provider: Arc<dyn PaymentProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { config: Arc::new(config), provider, clock }
    }
}
