//! Audit log repository implementation.

use sqlx::{PgPool, Postgres, QueryBuilder};

use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_entity::audit::{AuditFilter, AuditLogEntry, NewAuditLogEntry};

use super::db_error;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn create(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_logs (user_id, action, entity, entity_id, details, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(&entry.entity)
        .bind(&entry.entity_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to write audit entry"))
    }

    /// Search the log, newest first.
    pub async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count audit entries"))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM audit_logs");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let entries = select
            .build_query_as::<AuditLogEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to search audit log"))?;

        Ok(PageResponse::new(entries, page, total as u64))
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    builder.push(" WHERE TRUE");
    if let Some(action) = filter.action {
        builder.push(" AND action = ").push_bind(action);
    }
    if let Some(entity) = &filter.entity {
        builder.push(" AND entity = ").push_bind(entity.clone());
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(from) = filter.from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND created_at <= ").push_bind(to);
    }
}
