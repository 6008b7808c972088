//! Health check handlers for service monitoring.
//!
//! The proxy has no database or queue to probe. Its one hard dependency is
//! the provider credential, so health is `degraded` when none is configured.
//! The provider itself is not called: probes run often and must stay cheap.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks
    pub checks: HealthChecks,
    /// Service version information
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Ready to serve payment requests
    Healthy,
    /// Running, but payment requests will fail
    Degraded,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Provider credential presence
    pub credential: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
    /// Optional error message if down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Component-level health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy
    Up,
    /// Component is unavailable
    Down,
}

fn check(state: &AppState) -> HealthResponse {
    let credential = if state.config.api_key.is_some() {
        ComponentHealth { status: ComponentStatus::Up, message: None }
    } else {
        ComponentHealth {
            status: ComponentStatus::Down,
            message: Some("PI_API_KEY is not configured".to_string()),
        }
    };

    let status = match credential.status {
        ComponentStatus::Up => HealthStatus::Healthy,
        ComponentStatus::Down => HealthStatus::Degraded,
    };

    HealthResponse {
        status,
        timestamp: DateTime::<Utc>::from(state.clock.now_system()),
        checks: HealthChecks { credential },
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Health check endpoint handler.
///
/// Always 200 while the process serves requests; `status` tells whether
/// payments can succeed.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = check(&state);
    debug!(status = ?response.status, "Health check completed");
    (StatusCode::OK, Json(response))
}

/// Readiness check endpoint for orchestration probes.
///
/// Same body as the health check, but 503 unless the service can process
/// payments.
#[instrument(name = "readiness_check", skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = check(&state);
    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    debug!(status = ?response.status, "Readiness check completed");
    (status_code, Json(response))
}

/// Liveness check endpoint.
///
/// Minimal check that does not look at configuration.
#[instrument(name = "liveness_check", skip(state))]
pub async fn liveness_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "alive",
        "timestamp": DateTime::<Utc>::from(state.clock.now_system()),
        "service": "pibridge"
    });

    (StatusCode::OK, Json(response))
}
