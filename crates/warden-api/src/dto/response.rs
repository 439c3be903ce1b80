//! Response DTOs and the success envelope.

use axum::Json;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::{Identity, SsoIdentity, TokenPair};
use warden_core::types::PageResponse;
use warden_entity::user::UserProfile;

/// Outcome categories of a successful request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessCode {
    /// Read or action succeeded.
    Success,
    /// A resource was created.
    Created,
    /// A resource was updated.
    Updated,
    /// A resource was deleted.
    Deleted,
}

impl SuccessCode {
    /// Two-digit response code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Success => "01",
            Self::Created => "02",
            Self::Updated => "03",
            Self::Deleted => "04",
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Created => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page (1-based).
    pub page: u64,
    /// Items per page.
    pub limit: u64,
    /// Total items.
    pub total: u64,
    /// Total pages.
    pub total_pages: u64,
}

/// Standard success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Two-digit outcome code followed by the service code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Payload.
    pub data: T,
    /// Pagination, for lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

/// What handlers return on success.
pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

impl<T: Serialize> ApiResponse<T> {
    /// Wraps `data`.
    pub fn new(outcome: SuccessCode, service_code: &str, message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            code: format!("{}{}", outcome.code(), service_code),
            message: message.into(),
            data,
            meta: None,
        }
    }

    /// Converts into the handler return type.
    pub fn reply(self, outcome: SuccessCode) -> Reply<T> {
        (outcome.status(), Json(self))
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Wraps one page of results.
    pub fn page(service_code: &str, message: impl Into<String>, page: PageResponse<T>) -> Self {
        let meta = PageMeta {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        };
        Self {
            meta: Some(meta),
            ..Self::new(SuccessCode::Success, service_code, message, page.items)
        }
    }
}

/// Login and SSO login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user: UserProfile,
}

/// SSO verification payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoVerifyResponse {
    /// Whether the token was accepted.
    pub valid: bool,
    /// Normalized identity when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SsoIdentity>,
}

/// `GET /auth/me` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// Caller identity.
    #[serde(flatten)]
    pub identity: Identity,
    /// Permission codes held by the caller's role, sorted.
    pub permissions: Vec<String>,
}

/// Health check payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Store reachability.
    pub database: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the state was built.
    pub uptime_seconds: u64,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use warden_core::types::PageRequest;

    use super::*;

    #[test]
    fn test_codes_carry_service_code() {
        let resp = ApiResponse::new(SuccessCode::Created, "0001", "Created", 1u8);
        assert_eq!(resp.code, "020001");
        assert_eq!(resp.reply(SuccessCode::Created).0, StatusCode::CREATED);
    }

    #[test]
    fn test_page_meta() {
        let page = PageResponse::new(vec![1u8, 2], &PageRequest::new(2, 2), 5);
        let resp = ApiResponse::page("0001", "Listed", page);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["meta"]["total_pages"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["code"], "010001");
    }
}
