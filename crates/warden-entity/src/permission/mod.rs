//! Permission reference data.

pub mod model;

pub use model::{Permission, PermissionSeed, RolePermission};
