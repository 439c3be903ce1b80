//! Unified application error types for Warden.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The [`ErrorKind`] is the stable,
//! machine-readable part; the message is for humans.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Email/password pair did not match an active account.
    InvalidCredentials,
    /// A token was malformed, had a bad signature, or was revoked.
    InvalidToken,
    /// A token was well-formed but past its expiry.
    TokenExpired,
    /// No credential, or a garbled one, was presented.
    Unauthorized,
    /// Valid identity, but insufficient rights or an inactive account.
    Forbidden,
    /// A uniqueness constraint was violated on create.
    DuplicateEntry,
    /// SSO login is switched off.
    SsoDisabled,
    /// SSO is on but no shared secret is configured.
    SsoNotConfigured,
    /// An external token lacked required claims.
    InvalidPayload,
    /// An external token was issued for another audience.
    InvalidAudience,
    /// The caller exceeded a request quota.
    TooManyRequests,
    /// Transient failure talking to the backing store.
    StoreError,
    /// The backing store did not answer within the deadline.
    ServiceUnavailable,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// The request was well-formed but not acceptable.
    BadRequest,
    /// An internal server error occurred.
    Internal,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl ErrorKind {
    /// Two-digit response code for this kind.
    pub fn response_code(&self) -> &'static str {
        match self {
            Self::BadRequest => "10",
            Self::Unauthorized | Self::SsoDisabled | Self::SsoNotConfigured => "11",
            Self::Forbidden => "12",
            Self::NotFound => "13",
            Self::Validation => "14",
            Self::DuplicateEntry => "15",
            Self::InvalidToken | Self::InvalidAudience | Self::InvalidPayload => "16",
            Self::TokenExpired => "17",
            Self::InvalidCredentials => "18",
            Self::TooManyRequests => "19",
            Self::ServiceUnavailable => "51",
            Self::StoreError => "52",
            Self::Internal | Self::Configuration | Self::Serialization => "50",
        }
    }

    /// Whether a caller may reasonably retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreError | Self::ServiceUnavailable)
    }

    /// Whether this kind is an infrastructure fault rather than an expected outcome.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::StoreError
                | Self::ServiceUnavailable
                | Self::Internal
                | Self::Configuration
                | Self::Serialization
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            Self::SsoDisabled => write!(f, "SSO_DISABLED"),
            Self::SsoNotConfigured => write!(f, "SSO_NOT_CONFIGURED"),
            Self::InvalidPayload => write!(f, "INVALID_TOKEN_PAYLOAD"),
            Self::InvalidAudience => write!(f, "INVALID_AUDIENCE"),
            Self::TooManyRequests => write!(f, "TOO_MANY_REQUESTS"),
            Self::StoreError => write!(f, "DATABASE_ERROR"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION_ERROR"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Internal => write!(f, "INTERNAL_ERROR"),
            Self::Configuration => write!(f, "CONFIGURATION_ERROR"),
            Self::Serialization => write!(f, "SERIALIZATION_ERROR"),
        }
    }
}

/// The unified application error used throughout Warden.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-credentials error with the standard message.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid email or password")
    }

    /// Create an invalid-token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create a token-expired error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a duplicate-entry error.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateEntry, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreError, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a too-many-requests error.
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TooManyRequests, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Whether this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
