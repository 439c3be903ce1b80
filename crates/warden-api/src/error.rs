//! Maps domain `AppError` to HTTP responses.
//!
//! [`ApiError`] renders a production-safe envelope on its own and attaches
//! an [`ErrorReport`] to the response. The `render_errors` middleware then
//! re-renders the body with the configured service code and, in
//! development, the cause chain.

use std::error::Error as _;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use validator::ValidationErrors;

use warden_core::error::{AppError, ErrorKind};

/// Service code used when no configuration is at hand.
const FALLBACK_SERVICE_CODE: &str = "0001";

/// Message shown instead of internal error text outside development.
const GENERIC_MESSAGE: &str = "An internal error occurred";

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Two-digit kind code followed by the service code.
    pub code: String,
    /// Machine-readable error kind.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Field errors, or the cause chain in development.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized
        | ErrorKind::InvalidToken
        | ErrorKind::TokenExpired
        | ErrorKind::InvalidCredentials
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidPayload
        | ErrorKind::SsoDisabled
        | ErrorKind::SsoNotConfigured => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateEntry => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::StoreError
        | ErrorKind::Internal
        | ErrorKind::Configuration
        | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Everything needed to render an error body later.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Error kind.
    pub kind: ErrorKind,
    /// Original message.
    pub message: String,
    /// Per-field validation messages.
    pub fields: Option<Value>,
    /// Source chain, outermost first.
    pub causes: Vec<String>,
}

impl ErrorReport {
    /// Renders the body for a deployment.
    pub fn body(&self, service_code: &str, development: bool) -> ApiErrorResponse {
        let hide_message = !development
            && matches!(
                self.kind,
                ErrorKind::Internal
                    | ErrorKind::StoreError
                    | ErrorKind::Configuration
                    | ErrorKind::Serialization
            );
        let details = match (&self.fields, development) {
            (Some(fields), _) => Some(fields.clone()),
            (None, true) if !self.causes.is_empty() => Some(Value::from(self.causes.clone())),
            _ => None,
        };
        ApiErrorResponse {
            success: false,
            code: format!("{}{}", self.kind.response_code(), service_code),
            error: self.kind.to_string(),
            message: if hide_message {
                GENERIC_MESSAGE.to_string()
            } else {
                self.message.clone()
            },
            details,
        }
    }
}

/// Error type returned by every handler and extractor.
#[derive(Debug)]
pub struct ApiError {
    inner: AppError,
    fields: Option<Value>,
}

impl ApiError {
    /// The wrapped domain error.
    pub fn app_error(&self) -> &AppError {
        &self.inner
    }

    /// Error kind.
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    fn report(&self) -> ErrorReport {
        let mut causes = Vec::new();
        let mut source = self.inner.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        ErrorReport {
            kind: self.inner.kind,
            message: self.inner.message.clone(),
            fields: self.fields.clone(),
            causes,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self {
            inner,
            fields: None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = serde_json::Map::new();
        for (field, errs) in errors.field_errors() {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            fields.insert(field.to_string(), Value::from(messages));
        }
        Self {
            inner: AppError::validation("Request validation failed"),
            fields: Some(Value::Object(fields)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match rejection {
            JsonRejection::JsonDataError(_) => ErrorKind::Validation,
            _ => ErrorKind::BadRequest,
        };
        AppError::new(kind, rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.inner.kind);
        if self.inner.kind.is_server_fault() {
            error!(kind = %self.inner.kind, error = %self.inner, "Request failed");
        } else {
            debug!(kind = %self.inner.kind, message = %self.inner.message, "Request rejected");
        }

        let report = self.report();
        let mut response =
            (status, Json(report.body(FALLBACK_SERVICE_CODE, false))).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::SsoDisabled), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::InvalidAudience), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::DuplicateEntry), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::TooManyRequests), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status_for(ErrorKind::ServiceUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(ErrorKind::StoreError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_text_hidden_outside_development() {
        let io = std::io::Error::other("connection reset by peer");
        let err = ApiError::from(AppError::with_source(
            ErrorKind::StoreError,
            "insert into users failed",
            io,
        ));
        let report = err.report();

        let production = report.body("0001", false);
        assert_eq!(production.code, "520001");
        assert_eq!(production.error, "DATABASE_ERROR");
        assert_eq!(production.message, GENERIC_MESSAGE);
        assert!(production.details.is_none());

        let development = report.body("0001", true);
        assert_eq!(development.message, "insert into users failed");
        assert_eq!(
            development.details,
            Some(Value::from(vec!["connection reset by peer".to_string()]))
        );
    }

    #[test]
    fn test_expected_failures_keep_their_message() {
        let report = ApiError::from(AppError::invalid_credentials()).report();
        let body = report.body("4242", false);
        assert_eq!(body.code, "184242");
        assert_eq!(body.error, "INVALID_CREDENTIALS");
        assert_eq!(body.message, "Invalid email or password");
        assert!(!body.success);
    }
}
