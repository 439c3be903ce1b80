//! JWT token creation with separate access and refresh keys.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::Clock;
use warden_entity::user::UserRole;

use super::claims::{Claims, TokenType};

/// A signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// The signed claims.
    pub claims: Claims,
}

/// Signs access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes as i64),
            refresh_ttl: Duration::days(config.refresh_ttl_days as i64),
            clock,
        }
    }

    /// Lifetime of refresh tokens, which is also the stored record window.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Mints a token of the given type for this identity.
    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
        typ: TokenType,
    ) -> Result<IssuedToken, AppError> {
        let now = self.clock.now();
        let ttl = match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
            typ,
        };
        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Signs an arbitrary claim set with the key matching its type.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        let key = match claims.typ {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };
        encode(&Header::default(), claims, key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
