//! Route guards built on the authorization gate.
//!
//! Handlers call these after extracting [`AuthUser`]; a failed guard
//! returns `Forbidden`.

use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::user::UserRole;

use crate::extractors::AuthUser;

/// Any authenticated caller passes.
pub fn require_any(auth: &AuthUser) -> AppResult<()> {
    auth.gate().authorize_any(auth.identity())
}

/// The caller's role must hold at least one of `scopes`.
pub async fn require_scopes(auth: &AuthUser, scopes: &[&str]) -> AppResult<()> {
    auth.gate().authorize_scope(auth.identity(), scopes).await
}

/// The caller's role must be one of `roles`.
pub fn require_roles(auth: &AuthUser, roles: &[UserRole]) -> AppResult<()> {
    auth.gate().authorize_roles(auth.identity(), roles)
}

/// Admins pass; everyone else must be acting on their own resource.
pub fn require_self_or_admin(auth: &AuthUser, owner_id: Uuid) -> AppResult<()> {
    if auth.is_admin() || auth.user_id == owner_id {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only act on your own resources"))
    }
}
