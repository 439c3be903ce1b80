//! Refresh token repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::token::{NewRefreshToken, RefreshTokenRecord};

use super::{db_error, unique_violation};

/// Repository for persisted refresh tokens.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a record by the digest of its token.
    pub async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find refresh token"))
    }

    /// Insert a new record.
    pub async fn create(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "INSERT INTO refresh_tokens (token_hash, user_id, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.token_hash)
        .bind(data.user_id)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => AppError::duplicate("Refresh token already exists"),
            None => db_error("Failed to create refresh token")(e),
        })
    }

    /// Revoke every record with this digest. Returns the number of rows changed.
    pub async fn revoke_by_hash(&self, token_hash: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = $1 AND revoked = FALSE",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke refresh token"))?;
        Ok(result.rows_affected())
    }

    /// Revoke every outstanding record of a user.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke user refresh tokens"))?;
        Ok(result.rows_affected())
    }

    /// Revoke `old_id` and insert `new` in one transaction.
    ///
    /// The conditional update is the serialization point: of two concurrent
    /// rotations of the same row, the one that commits first flips
    /// `revoked`; the other re-evaluates the predicate after the lock is
    /// released, matches zero rows and is rolled back with `InvalidToken`.
    pub async fn rotate(
        &self,
        old_id: Uuid,
        new: &NewRefreshToken,
    ) -> AppResult<RefreshTokenRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin rotation"))?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE id = $1 AND revoked = FALSE",
        )
        .bind(old_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to revoke rotated token"))?;

        if revoked.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back rotation"))?;
            return Err(AppError::invalid_token("Refresh token has already been used"));
        }

        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "INSERT INTO refresh_tokens (token_hash, user_id, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&new.token_hash)
        .bind(new.user_id)
        .bind(new.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to insert rotated token"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit rotation"))?;

        Ok(record)
    }
}
