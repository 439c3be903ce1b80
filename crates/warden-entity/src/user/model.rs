//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Email address, stored lower-cased.
    pub email: String,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash. `None` for SSO-only accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Full name, when known.
    pub full_name: Option<String>,
    /// User role.
    pub role: UserRole,
    /// Whether the account may authenticate.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Public view of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// The fields of a user that may leave the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Username.
    pub username: String,
    /// Full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Role.
    pub role: UserRole,
    /// Active flag.
    pub is_active: bool,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address; normalized to lower case by the store.
    pub email: String,
    /// Desired username.
    pub username: String,
    /// Pre-hashed password, or `None` for SSO-provisioned accounts.
    pub password_hash: Option<String>,
    /// Full name (optional).
    pub full_name: Option<String>,
    /// Assigned role.
    pub role: UserRole,
}

/// Partial update of a user. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email.
    pub email: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// Filters for listing users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilter {
    /// Only users with this role.
    pub role: Option<UserRole>,
    /// Only active or only inactive users.
    pub is_active: Option<bool>,
    /// Case-insensitive substring of email or username.
    pub search: Option<String>,
}

impl UserFilter {
    /// Whether `user` passes this filter.
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|r| r != user.role) {
            return false;
        }
        if self.is_active.is_some_and(|a| a != user.is_active) {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) => {
                user.email.to_lowercase().contains(&needle)
                    || user.username.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}
