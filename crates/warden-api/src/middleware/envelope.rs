//! Final rendering of error bodies.

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ErrorReport;
use crate::state::AppState;

/// Re-renders error envelopes with the configured service code and
/// environment. Responses without an [`ErrorReport`] pass through.
pub async fn render_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let body = report.body(state.service_code(), state.config.app.is_development());
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    (parts, Json(body)).into_response()
}
