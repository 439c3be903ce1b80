//! The authenticated caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_entity::user::{User, UserRole};

/// Identity established by [`super::AuthorizationGate::authenticate`].
///
/// Role and email come from the store at authentication time, not from the
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User ID.
    pub user_id: Uuid,
    /// Current email.
    pub email: String,
    /// Current username.
    pub username: String,
    /// Current role.
    pub role: UserRole,
}

impl Identity {
    /// Whether the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}
