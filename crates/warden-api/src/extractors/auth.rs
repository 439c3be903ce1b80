//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header and authenticates it through the authorization gate.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use tracing::debug;

use warden_auth::{AuthorizationGate, Identity};
use warden_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
///
/// Carries the gate so route guards can check scopes without reaching
/// back into the state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    identity: Identity,
    gate: AuthorizationGate,
}

impl AuthUser {
    /// The caller.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The gate that authenticated the caller.
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }
}

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.identity
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Missing or malformed headers are rejected before any token work.
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    debug!(reason = %e, "Rejected authorization header");
                    AppError::unauthorized("Missing or malformed Authorization header")
                })?;

        if bearer.token().trim().is_empty() {
            return Err(AppError::unauthorized("Missing or malformed Authorization header").into());
        }

        let identity = state.gate.authenticate(bearer.token()).await?;
        Ok(Self {
            identity,
            gate: state.gate.clone(),
        })
    }
}
