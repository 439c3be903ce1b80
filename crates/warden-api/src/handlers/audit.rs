//! Audit log read handlers.

use axum::extract::{Query, State};
use axum_extra::extract::WithRejection;

use warden_entity::audit::{AuditFilter, AuditLogEntry};

use crate::dto::request::AuditListQuery;
use crate::dto::response::Reply;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthUser, PaginationParams};
use crate::middleware::{require_any, require_scopes};
use crate::state::AppState;

/// GET /api/{version}/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Query(page), _): WithRejection<Query<PaginationParams>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<AuditListQuery>, ApiError>,
) -> ApiResult<Reply<Vec<AuditLogEntry>>> {
    require_scopes(&auth, &["audit.list"]).await?;
    let page = page.into_page_request();
    let entries = state
        .deadline
        .run("audit.search", state.audit_log.search(&query.into(), &page))
        .await?;
    Ok(state.respond_page("Audit logs retrieved successfully", entries))
}

/// GET /api/{version}/audit-logs/me
pub async fn my_audit_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Query(page), _): WithRejection<Query<PaginationParams>, ApiError>,
) -> ApiResult<Reply<Vec<AuditLogEntry>>> {
    require_any(&auth)?;
    let filter = AuditFilter {
        user_id: Some(auth.user_id),
        ..AuditFilter::default()
    };
    let page = page.into_page_request();
    let entries = state
        .deadline
        .run("audit.search", state.audit_log.search(&filter, &page))
        .await?;
    Ok(state.respond_page("Your audit logs retrieved successfully", entries))
}
