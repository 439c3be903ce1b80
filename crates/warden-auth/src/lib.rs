//! # warden-auth
//!
//! Authentication and permission authorization for Warden.
//!
//! ## Modules
//!
//! - `jwt`: claims, signing and three-way verification
//! - `password`: Argon2id hashing and password policy
//! - `token`: login, refresh rotation, logout and registration
//! - `sso`: external token validation and auto-provisioning
//! - `rbac`: bearer authentication plus role and scope checks
//! - `audit`: fire-and-forget audit sinks

pub mod audit;
pub mod deadline;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod sso;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use audit::{AuditEvent, AuditSink, ClientContext, StoreAuditSink, TracingAuditSink};
pub use deadline::StoreDeadline;
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType, TokenVerification};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{AuthorizationGate, Identity};
pub use sso::{SsoBridge, SsoIdentity, SsoInfo, SsoVerification};
pub use token::{LoginResult, Registration, TokenPair, TokenService};
