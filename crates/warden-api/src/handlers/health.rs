//! Health check handler.

use axum::extract::State;
use chrono::Utc;
use tracing::warn;

use warden_core::error::AppError;

use crate::dto::SuccessCode;
use crate::dto::response::{HealthResponse, Reply};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/health
///
/// Fails with `ServiceUnavailable` when the store does not answer.
pub async fn health(State(state): State<AppState>) -> ApiResult<Reply<HealthResponse>> {
    if let Err(e) = state.deadline.run("ping", state.credentials.ping()).await {
        warn!(kind = %e.kind, error = %e, "Health check failed");
        return Err(AppError::service_unavailable("Database is not reachable").into());
    }

    Ok(state.respond(
        SuccessCode::Success,
        "Service is healthy",
        HealthResponse {
            status: "ok".to_string(),
            database: "connected".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            timestamp: Utc::now(),
        },
    ))
}

/// Fallback for unknown routes.
pub async fn not_found() -> crate::error::ApiError {
    AppError::not_found("Route not found").into()
}
