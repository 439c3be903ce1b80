//! Audit events and sinks.

pub mod event;
pub mod sink;

pub use event::{AuditEvent, ClientContext};
pub use sink::{AuditSink, StoreAuditSink, TracingAuditSink};
