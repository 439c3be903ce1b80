//! Persisted refresh token record.
//!
//! Records are never deleted: a rotated or logged-out token keeps its row
//! with `revoked = true`, which leaves an audit trail of the lineage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One outstanding (or spent) refresh credential.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// Row identifier.
    pub id: Uuid,
    /// SHA-256 digest (hex) of the token string. Unique.
    pub token_hash: String,
    /// Owner.
    pub user_id: Uuid,
    /// Authoritative expiry.
    pub expires_at: DateTime<Utc>,
    /// Set on rotation or logout. Never cleared.
    pub revoked: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a refresh record as seen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    /// Usable for rotation.
    Active,
    /// Revoked by rotation or logout.
    Revoked,
    /// Past its stored expiry. Derived at read time, never written.
    Expired,
}

impl RefreshTokenRecord {
    /// Whether the stored expiry has been reached. Expiry is exclusive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// State of this record at `now`. Revocation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked {
            RefreshTokenState::Revoked
        } else if self.is_expired_at(now) {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Data required to persist a freshly minted refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRefreshToken {
    /// SHA-256 digest (hex) of the token string.
    pub token_hash: String,
    /// Owner.
    pub user_id: Uuid,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
}
