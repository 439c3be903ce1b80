//! Token and password configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum accepted length of a signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from `access_secret`.
    pub refresh_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Deadline for a single store call, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
    /// How long role permission sets may be served from cache. 0 disables caching.
    #[serde(default = "default_permission_cache_ttl")]
    pub permission_cache_ttl_seconds: u64,
}

impl AuthConfig {
    /// Builds a config with the given secrets and defaults for everything else.
    pub fn with_secrets(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
            store_timeout_ms: default_store_timeout(),
            permission_cache_ttl_seconds: default_permission_cache_ttl(),
        }
    }

    /// Store deadline as a `Duration`.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.access_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::configuration(format!(
                "auth.access_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.refresh_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::configuration(format!(
                "auth.refresh_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.access_secret == self.refresh_secret {
            return Err(AppError::configuration(
                "auth.access_secret and auth.refresh_secret must differ",
            ));
        }
        if self.access_ttl_minutes == 0 || self.refresh_ttl_days == 0 {
            return Err(AppError::configuration("token TTLs must be positive"));
        }
        Ok(())
    }
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_password_min() -> usize {
    8
}

fn default_store_timeout() -> u64 {
    5000
}

fn default_permission_cache_ttl() -> u64 {
    30
}
