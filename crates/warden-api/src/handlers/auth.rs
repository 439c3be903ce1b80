//! Auth handlers: register, login, refresh, logout, me and SSO.

use axum::body::Bytes;
use axum::extract::State;
use tracing::debug;

use warden_auth::{Registration, SsoInfo, TokenPair};
use warden_entity::user::UserProfile;

use crate::dto::SuccessCode;
use crate::dto::request::{
    LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, SsoTokenRequest,
};
use crate::dto::response::{LoginResponse, MeResponse, Reply, SsoVerifyResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ClientInfo, ValidatedJson};
use crate::middleware::require_any;
use crate::state::AppState;

/// POST /api/{version}/auth/register
pub async fn register(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Reply<UserProfile>> {
    let profile = state
        .tokens
        .register(
            Registration {
                email: req.email,
                username: req.username,
                password: req.password,
                full_name: req.full_name,
            },
            &client,
        )
        .await?;

    Ok(state.respond(SuccessCode::Created, "User registered successfully", profile))
}

/// POST /api/{version}/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Reply<LoginResponse>> {
    let result = state.tokens.login(&req.email, &req.password, &client).await?;

    Ok(state.respond(
        SuccessCode::Success,
        "Login successful",
        LoginResponse {
            tokens: result.tokens,
            user: result.user,
        },
    ))
}

/// POST /api/{version}/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Reply<TokenPair>> {
    let tokens = state.tokens.refresh(&req.refresh_token).await?;
    Ok(state.respond(SuccessCode::Success, "Token refreshed successfully", tokens))
}

/// POST /api/{version}/auth/logout
///
/// Succeeds whether or not a token is supplied or known.
pub async fn logout(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    body: Bytes,
) -> ApiResult<Reply<()>> {
    let req: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            debug!(error = %e, "Ignoring unreadable logout body");
            LogoutRequest::default()
        })
    };

    if let Some(token) = req.refresh_token.as_deref() {
        state.tokens.logout(token, &client).await?;
    }

    Ok(state.respond(SuccessCode::Success, "Logout successful", ()))
}

/// GET /api/{version}/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Reply<MeResponse>> {
    require_any(&auth)?;
    let granted = state.gate.role_permissions(auth.role).await?;
    let mut permissions: Vec<String> = granted.iter().cloned().collect();
    permissions.sort();

    Ok(state.respond(
        SuccessCode::Success,
        "Current user retrieved",
        MeResponse {
            identity: auth.identity().clone(),
            permissions,
        },
    ))
}

/// POST /api/{version}/auth/sso/login
pub async fn sso_login(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    ValidatedJson(req): ValidatedJson<SsoTokenRequest>,
) -> ApiResult<Reply<LoginResponse>> {
    let result = state.sso.sso_login(&req.sso_token, &client).await?;

    Ok(state.respond(
        SuccessCode::Success,
        "SSO login successful",
        LoginResponse {
            tokens: result.tokens,
            user: result.user,
        },
    ))
}

/// POST /api/{version}/auth/sso/verify
pub async fn sso_verify(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SsoTokenRequest>,
) -> ApiResult<Reply<SsoVerifyResponse>> {
    let identity = state.sso.verify(&req.sso_token)?;

    Ok(state.respond(
        SuccessCode::Success,
        "SSO token is valid",
        SsoVerifyResponse {
            valid: true,
            user: Some(identity),
        },
    ))
}

/// GET /api/{version}/auth/sso/info
pub async fn sso_info(State(state): State<AppState>) -> ApiResult<Reply<SsoInfo>> {
    Ok(state.respond(
        SuccessCode::Success,
        "SSO configuration retrieved",
        state.sso.info(),
    ))
}
