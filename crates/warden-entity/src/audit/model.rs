//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::AuditAction;

/// An immutable audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The acting user, if known.
    pub user_id: Option<Uuid>,
    /// What happened.
    pub action: AuditAction,
    /// The type of target resource (e.g. `"User"`, `"Post"`).
    pub entity: String,
    /// The target resource ID, if any.
    pub entity_id: Option<String>,
    /// Free-form detail.
    pub details: Option<String>,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// User-Agent of the actor.
    pub user_agent: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditLogEntry {
    /// The acting user.
    pub user_id: Option<Uuid>,
    /// What happened.
    pub action: AuditAction,
    /// Target resource type.
    pub entity: String,
    /// Target resource ID.
    pub entity_id: Option<String>,
    /// Free-form detail.
    pub details: Option<String>,
    /// Actor's IP address.
    pub ip_address: Option<String>,
    /// Actor's User-Agent.
    pub user_agent: Option<String>,
}

/// Filters for searching the audit log. All present filters must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Only this action.
    pub action: Option<AuditAction>,
    /// Only this entity type.
    pub entity: Option<String>,
    /// Only this actor.
    pub user_id: Option<Uuid>,
    /// Entries at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Entries at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl AuditFilter {
    /// Whether `entry` passes this filter.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.action.is_none_or(|a| a == entry.action)
            && self.entity.as_deref().is_none_or(|e| e == entry.entity)
            && self.user_id.is_none_or(|u| Some(u) == entry.user_id)
            && self.from.is_none_or(|f| entry.created_at >= f)
            && self.to.is_none_or(|t| entry.created_at <= t)
    }
}
