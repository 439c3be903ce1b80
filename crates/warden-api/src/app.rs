//! Application builder: wires router, middleware and state into an Axum
//! app, and runs it with graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use warden_core::error::AppError;

use crate::middleware::build_cors_layer;
use crate::middleware::envelope::render_errors;
use crate::middleware::logging::request_logging;
use crate::middleware::rate_limit::enforce;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(&state)
        .layer(axum_middleware::from_fn_with_state(
            state.limits.global.clone(),
            enforce,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            render_errors,
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn run_server(state: AppState) -> Result<(), AppError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let app = build_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "Warden server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(grace))
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Warden server stopped");
    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(grace_seconds = grace.as_secs(), "Shutdown signal received, draining connections");
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!("Graceful shutdown window elapsed, exiting");
        std::process::exit(0);
    });
}
