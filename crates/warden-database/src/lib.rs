//! # warden-database
//!
//! PostgreSQL connection management, the narrow store traits the auth core
//! consumes, and two implementations of them: Postgres-backed repositories
//! and an in-memory store for tests and demos.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod seed;
pub mod store;

pub use connection::DatabasePool;
pub use store::{AuditStore, CredentialStore, MemoryStore, PgStore, PostStore};
