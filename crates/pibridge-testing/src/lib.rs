//! Test harness for pibridge integration tests.
//!
//! Provides a wiremock-backed stand-in for the provider ([`MockPi`]), a
//! driver that pushes requests through the real router without a socket
//! ([`TestApp`]), and request fixtures.

pub mod app;
pub mod fixtures;
pub mod http;

pub use app::{TestApp, TestResponse};
pub use http::MockPi;
use tracing_subscriber::EnvFilter;

/// Installs a test log subscriber once per process.
///
/// Honors `RUST_LOG`; silent beyond warnings otherwise. Later calls are
/// no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
