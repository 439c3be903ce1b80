//! Authentication of bearer tokens and role/scope authorization.

pub mod gate;
pub mod identity;

pub use gate::{AuthorizationGate, PermissionSet};
pub use identity::Identity;
