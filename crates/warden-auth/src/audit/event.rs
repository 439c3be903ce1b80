//! Audit events and the request context they carry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_entity::audit::{AuditAction, NewAuditLogEntry};

/// Where a request came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    /// Peer or forwarded IP address.
    pub ip: Option<String>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
}

impl ClientContext {
    /// Context with both fields set.
    pub fn new(ip: Option<String>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }
}

/// Something worth recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Acting user, if known.
    pub actor_id: Option<Uuid>,
    /// What happened.
    pub action: AuditAction,
    /// Target resource type.
    pub entity: String,
    /// Target resource ID.
    pub entity_id: Option<String>,
    /// Free-form detail.
    pub detail: Option<String>,
    /// Actor IP.
    pub ip: Option<String>,
    /// Actor User-Agent.
    pub user_agent: Option<String>,
}

impl AuditEvent {
    /// An event with no actor, target or detail.
    pub fn new(action: AuditAction, entity: impl Into<String>) -> Self {
        Self {
            actor_id: None,
            action,
            entity: entity.into(),
            entity_id: None,
            detail: None,
            ip: None,
            user_agent: None,
        }
    }

    /// Sets the acting user.
    pub fn by(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Sets the target resource ID.
    pub fn target(mut self, entity_id: impl ToString) -> Self {
        self.entity_id = Some(entity_id.to_string());
        self
    }

    /// Sets the detail text.
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Copies IP and User-Agent from the request context.
    pub fn from_client(mut self, client: &ClientContext) -> Self {
        self.ip = client.ip.clone();
        self.user_agent = client.user_agent.clone();
        self
    }
}

impl From<AuditEvent> for NewAuditLogEntry {
    fn from(event: AuditEvent) -> Self {
        Self {
            user_id: event.actor_id,
            action: event.action,
            entity: event.entity,
            entity_id: event.entity_id,
            details: event.detail,
            ip_address: event.ip,
            user_agent: event.user_agent,
        }
    }
}
