//! Permission and role grant repository implementation.

use sqlx::PgPool;

use warden_core::result::AppResult;
use warden_entity::permission::{Permission, PermissionSeed};
use warden_entity::user::UserRole;

use super::db_error;

/// Repository for permission reference data.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Codes granted to `role`, sorted.
    pub async fn codes_for_role(&self, role: UserRole) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT p.code FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role = $1 \
             ORDER BY p.code",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load role permissions"))
    }

    /// All known permissions.
    pub async fn find_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list permissions"))
    }

    /// Insert a permission if its code is new.
    pub async fn upsert(&self, seed: &PermissionSeed) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO permissions (code, name, description, resource, action) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(seed.code)
        .bind(seed.name)
        .bind(seed.description)
        .bind(seed.resource())
        .bind(seed.action())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to seed permission"))?;
        Ok(())
    }

    /// Grant the permission with `code` to `role` if not already granted.
    pub async fn grant(&self, role: UserRole, code: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO role_permissions (role, permission_id) \
             SELECT $1, id FROM permissions WHERE code = $2 \
             ON CONFLICT (role, permission_id) DO NOTHING",
        )
        .bind(role)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to grant permission"))?;
        Ok(())
    }
}
