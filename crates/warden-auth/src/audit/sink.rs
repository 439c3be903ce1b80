//! Fire-and-forget audit sinks.
//!
//! `record` never blocks the caller on I/O and never fails it; write
//! problems are logged and dropped.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{info, warn};

use warden_database::AuditStore;
use warden_entity::audit::NewAuditLogEntry;

use super::event::AuditEvent;
use crate::deadline::StoreDeadline;

/// Receives audit events.
pub trait AuditSink: Debug + Send + Sync + 'static {
    /// Records `event`. Must return promptly.
    fn record(&self, event: AuditEvent);
}

/// Writes events to an [`AuditStore`] on a background task.
#[derive(Clone)]
pub struct StoreAuditSink {
    store: Arc<dyn AuditStore>,
    deadline: StoreDeadline,
}

impl Debug for StoreAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreAuditSink")
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl StoreAuditSink {
    /// Creates a sink over `store`, bounding each write by `deadline`.
    pub fn new(store: Arc<dyn AuditStore>, deadline: StoreDeadline) -> Self {
        Self { store, deadline }
    }
}

impl AuditSink for StoreAuditSink {
    fn record(&self, event: AuditEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(action = %event.action, "No runtime available, audit event dropped");
            return;
        };
        let store = self.store.clone();
        let deadline = self.deadline;
        let entry = NewAuditLogEntry::from(event);
        handle.spawn(async move {
            let result = deadline.run("audit.append", store.append(&entry)).await;
            if let Err(e) = result {
                warn!(
                    action = %entry.action,
                    entity = %entry.entity,
                    user_id = ?entry.user_id,
                    kind = %e.kind,
                    error = %e,
                    "Failed to write audit log entry"
                );
            }
        });
    }
}

/// Emits events as tracing records only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            target: "warden::audit",
            action = %event.action,
            entity = %event.entity,
            entity_id = ?event.entity_id,
            user_id = ?event.actor_id,
            ip = ?event.ip,
            detail = ?event.detail,
            "Audit event"
        );
    }
}
