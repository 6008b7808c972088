//! pibridge payment proxy.
//!
//! Main entry point. Loads configuration, builds the provider client and
//! serves the payment endpoints until a shutdown signal arrives.

use std::sync::Arc;

use anyhow::{Context, Result};
use pibridge_api::{AppState, Config};
use pibridge_client::PiClient;
use pibridge_core::RealClock;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log)?;

    info!("Starting pibridge payment proxy");
    info!(
        pi_api_base_url = %config.pi_api_base_url,
        pi_api_key = %config.api_key_masked(),
        provider_timeout_seconds = ?config.provider_timeout_seconds,
        request_timeout_seconds = config.request_timeout,
        "Configuration loaded"
    );
    if config.pi_api_key.is_none() {
        warn!("PI_API_KEY is not set; payment requests will fail until it is configured");
    }

    let client =
        PiClient::new(config.to_client_config()).context("Failed to build provider client")?;
    let state = AppState::new(config.to_payments_config(), Arc::new(client), Arc::new(RealClock));

    let addr = config.parse_server_addr()?;
    pibridge_api::start_server(state, addr, config.request_timeout())
        .await
        .context("HTTP server failed")?;

    info!("pibridge shutdown complete");
    Ok(())
}

/// Initializes tracing with the configured filter directives.
fn init_tracing(directives: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter: {directives}"))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    Ok(())
}
