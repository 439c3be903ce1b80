//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use warden_entity::audit::{AuditAction, AuditFilter};
use warden_entity::post::{PostFilter, PostSort, SortOrder};
use warden_entity::user::{UserFilter, UserRole};

/// Usernames are 3 to 30 ASCII letters, digits or underscores.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset").with_message(
            "Username may only contain letters, digits and underscores".into(),
        ))
    }
}

/// Self-registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Username.
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3-30 characters"),
        custom(function = validate_username)
    )]
    pub username: String,
    /// Password; the configured policy is applied by the token service.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Full name.
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request body. A missing token still logs out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// Refresh token to revoke.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body carrying an externally issued SSO token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SsoTokenRequest {
    /// The external token.
    #[validate(length(min = 1, message = "SSO token is required"))]
    pub sso_token: String,
}

/// Create user request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Username.
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3-30 characters"),
        custom(function = validate_username)
    )]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Full name.
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    /// Role, USER when omitted.
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Partial user update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New email.
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// New username.
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3-30 characters"),
        custom(function = validate_username)
    )]
    pub username: Option<String>,
    /// New password.
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
    /// New role (admin only).
    pub role: Option<UserRole>,
    /// New active flag (admin only).
    pub is_active: Option<bool>,
}

/// Create post request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// Body.
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    /// Publish immediately.
    #[serde(default)]
    pub published: bool,
}

/// Partial post update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePostRequest {
    /// New title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    /// New body.
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,
    /// New visibility.
    pub published: Option<bool>,
}

/// `GET /users` filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    /// Role filter.
    pub role: Option<UserRole>,
    /// Active filter.
    pub is_active: Option<bool>,
    /// Email or username substring.
    pub search: Option<String>,
}

impl From<UserListQuery> for UserFilter {
    fn from(q: UserListQuery) -> Self {
        Self {
            role: q.role,
            is_active: q.is_active,
            search: q.search.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// `GET /posts` filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    /// Published filter.
    pub published: Option<bool>,
    /// Title or content substring.
    pub search: Option<String>,
    /// Sort column.
    #[serde(default)]
    pub sort_by: PostSort,
    /// Sort direction.
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl PostListQuery {
    /// Filter for a viewer; `None` sees every post.
    pub fn into_filter(self, visible_to: Option<Uuid>) -> PostFilter {
        PostFilter {
            published: self.published,
            search: self.search.filter(|s| !s.trim().is_empty()),
            visible_to,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

/// `GET /audit-logs` filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditListQuery {
    /// Action filter.
    pub action: Option<AuditAction>,
    /// Entity type filter.
    pub entity: Option<String>,
    /// Actor filter.
    pub user_id: Option<Uuid>,
    /// Lower bound, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Upper bound, inclusive.
    pub to: Option<DateTime<Utc>>,
}

impl From<AuditListQuery> for AuditFilter {
    fn from(q: AuditListQuery) -> Self {
        Self {
            action: q.action,
            entity: q.entity,
            user_id: q.user_id,
            from: q.from,
            to: q.to,
        }
    }
}
