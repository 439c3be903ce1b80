//! JWT verification as a three-way outcome.
//!
//! Signature checking is delegated to `jsonwebtoken`; expiry is evaluated
//! here against the injected [`Clock`] so that the boundary second is
//! deterministic and treated as expired.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::Clock;

use super::claims::{Claims, TokenType};

/// Outcome of verifying a signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerification<C> {
    /// Signature valid, not expired.
    Valid(C),
    /// Signature valid, but at or past expiry.
    Expired,
    /// Garbled, wrongly signed, wrong type or missing claims.
    Malformed,
}

impl<C> TokenVerification<C> {
    /// Converts into a result with the standard token error kinds.
    pub fn into_result(self, what: &str) -> Result<C, AppError> {
        match self {
            Self::Valid(claims) => Ok(claims),
            Self::Expired => Err(AppError::token_expired(format!("{what} has expired"))),
            Self::Malformed => Err(AppError::invalid_token(format!("Invalid {}", what.to_lowercase()))),
        }
    }

    /// Whether this is `Valid`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// HS256 validation that checks the signature only. Time-based and
/// audience checks are done by the caller.
pub(crate) fn signature_only() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation.leeway = 0;
    validation
}

/// Like [`signature_only`], but accepts any HMAC algorithm the issuer
/// picked. Used for externally minted tokens.
pub(crate) fn any_hmac() -> Validation {
    let mut validation = signature_only();
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation
}

/// Verifies the signature of `token` and deserializes its payload.
pub(crate) fn decode_claims<T: DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Option<T> {
    decode::<T>(token, key, validation).ok().map(|data| data.claims)
}

/// Verifies access and refresh tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            access_key: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation: signature_only(),
            clock,
        }
    }

    /// Verifies an access token.
    pub fn verify_access(&self, token: &str) -> TokenVerification<Claims> {
        self.verify(token, &self.access_key, TokenType::Access)
    }

    /// Verifies a refresh token.
    pub fn verify_refresh(&self, token: &str) -> TokenVerification<Claims> {
        self.verify(token, &self.refresh_key, TokenType::Refresh)
    }

    /// The instant expiry is evaluated against.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn verify(&self, token: &str, key: &DecodingKey, expected: TokenType) -> TokenVerification<Claims> {
        let Some(claims) = decode_claims::<Claims>(token, key, &self.validation) else {
            return TokenVerification::Malformed;
        };
        if claims.typ != expected {
            return TokenVerification::Malformed;
        }
        if claims.is_expired_at(self.clock.now()) {
            return TokenVerification::Expired;
        }
        TokenVerification::Valid(claims)
    }
}
