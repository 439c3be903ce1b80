//! Default permission matrix.
//!
//! ADMIN holds every permission. USER holds its own profile, the post
//! resource, its own audit trail and the file resource.

use sqlx::PgPool;
use tracing::info;

use warden_core::result::AppResult;
use warden_entity::permission::PermissionSeed;
use warden_entity::user::UserRole;

use crate::repositories::PermissionRepository;

const fn seed(code: &'static str, name: &'static str, description: &'static str) -> PermissionSeed {
    PermissionSeed {
        code,
        name,
        description,
    }
}

/// Every permission the service knows about.
pub const PERMISSIONS: &[PermissionSeed] = &[
    seed("user.list", "List Users", "View the list of users"),
    seed("user.read", "Read User", "View a user's details"),
    seed("user.create", "Create User", "Create new users"),
    seed("user.update", "Update User", "Update user accounts"),
    seed("user.delete", "Delete User", "Delete user accounts"),
    seed("user.profile", "User Profile", "View own profile"),
    seed("post.list", "List Posts", "View the list of posts"),
    seed("post.read", "Read Post", "View a post"),
    seed("post.create", "Create Post", "Create posts"),
    seed("post.update", "Update Post", "Update posts"),
    seed("post.delete", "Delete Post", "Delete posts"),
    seed("audit.list", "List Audit Logs", "View all audit logs"),
    seed("audit.read", "Read Audit Log", "View an audit log entry"),
    seed("audit.me", "My Audit Logs", "View own audit logs"),
    seed("file.list", "List Files", "View the list of files"),
    seed("file.read", "Read File", "Download a file"),
    seed("file.create", "Upload File", "Upload files"),
    seed("file.delete", "Delete File", "Delete files"),
    seed("email.send", "Send Email", "Send emails"),
    seed("email.view", "View Email", "View email history"),
];

const USER_CODES: &[&str] = &[
    "user.profile",
    "post.list",
    "post.read",
    "post.create",
    "post.update",
    "post.delete",
    "audit.me",
    "file.list",
    "file.read",
    "file.create",
    "file.delete",
];

/// Codes granted to `role` by default.
pub fn default_codes(role: UserRole) -> Vec<&'static str> {
    match role {
        UserRole::Admin => PERMISSIONS.iter().map(|p| p.code).collect(),
        UserRole::User => USER_CODES.to_vec(),
    }
}

/// Insert the default permission matrix. Safe to run repeatedly.
pub async fn seed_permissions(pool: &PgPool) -> AppResult<()> {
    let repo = PermissionRepository::new(pool.clone());
    for permission in PERMISSIONS {
        repo.upsert(permission).await?;
    }
    for role in UserRole::ALL {
        for code in default_codes(role) {
            repo.grant(role, code).await?;
        }
    }
    info!(permissions = PERMISSIONS.len(), "Permission matrix seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = PERMISSIONS.iter().map(|p| p.code).collect();
        assert_eq!(codes.len(), PERMISSIONS.len());
    }

    #[test]
    fn test_user_grants_are_known_codes() {
        let known: HashSet<_> = PERMISSIONS.iter().map(|p| p.code).collect();
        for code in default_codes(UserRole::User) {
            assert!(known.contains(code), "unknown code {code}");
        }
    }

    #[test]
    fn test_admin_holds_everything() {
        assert_eq!(default_codes(UserRole::Admin).len(), PERMISSIONS.len());
        assert!(default_codes(UserRole::Admin).contains(&"user.delete"));
        assert!(!default_codes(UserRole::User).contains(&"user.delete"));
    }

    #[test]
    fn test_seed_splits_resource_and_action() {
        let p = PERMISSIONS[0];
        assert_eq!(p.resource(), "user");
        assert_eq!(p.action(), "list");
    }
}
