//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement
//! 4. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server stops accepting connections on SIGTERM or CTRL+C and lets
//! in-flight requests finish.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{handlers, AppState};

/// Default bound on handling a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the Axum router with all routes and middleware.
///
/// The payment routes accept only POST; any other method is answered by
/// [`handlers::method_not_allowed`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use pibridge_api::{server::create_router, AppState};
///
/// fn build(state: AppState) -> axum::Router {
///     create_router(state, Duration::from_secs(30))
/// }
/// ```
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check));

    let payment_routes = Router::new()
        .route(
            "/a2u",
            post(handlers::create_a2u_payment).fallback(handlers::method_not_allowed),
        )
        .route(
            "/pi-payment",
            post(handlers::handle_payment_action).fallback(handlers::method_not_allowed),
        );

    Router::new()
        .merge(health_routes)
        .merge(payment_routes)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject request ID into all responses.
///
/// Adds X-Request-Id header for tracing requests across services.
async fn inject_request_id(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    request_timeout: Duration,
) -> Result<(), std::io::Error> {
    let app = create_router(state, request_timeout);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Draining in-flight payment requests");
}
