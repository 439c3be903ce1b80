//! Permission and role grant models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserRole;

/// A capability descriptor such as `post.create`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Row identifier.
    pub id: Uuid,
    /// Unique code, `<resource>.<action>`.
    pub code: String,
    /// Human name.
    pub name: String,
    /// Longer description.
    pub description: Option<String>,
    /// Resource the permission applies to.
    pub resource: String,
    /// Action on the resource.
    pub action: String,
    /// When the permission was seeded.
    pub created_at: DateTime<Utc>,
}

/// Grant of a permission to a role. `(role, permission_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    /// Row identifier.
    pub id: Uuid,
    /// Granted role.
    pub role: UserRole,
    /// Granted permission.
    pub permission_id: Uuid,
}

/// Static description of a permission used to seed stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSeed {
    /// Unique code.
    pub code: &'static str,
    /// Human name.
    pub name: &'static str,
    /// Description.
    pub description: &'static str,
}

impl PermissionSeed {
    /// The part of the code before the dot.
    pub fn resource(&self) -> &'static str {
        self.code.split_once('.').map_or(self.code, |(r, _)| r)
    }

    /// The part of the code after the dot.
    pub fn action(&self) -> &'static str {
        self.code.split_once('.').map_or("", |(_, a)| a)
    }
}
