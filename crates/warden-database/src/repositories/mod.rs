//! Postgres repository implementations for all Warden entities.

pub mod audit;
pub mod permission;
pub mod post;
pub mod refresh_token;
pub mod user;

pub use audit::AuditLogRepository;
pub use permission::PermissionRepository;
pub use post::PostRepository;
pub use refresh_token::RefreshTokenRepository;
pub use user::UserRepository;

use warden_core::error::{AppError, ErrorKind};

/// Maps a sqlx failure into the store error taxonomy.
///
/// Pool exhaustion is reported as `ServiceUnavailable`; everything else is
/// a `StoreError` carrying `context` as its message.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::PoolTimedOut => AppError::with_source(
            ErrorKind::ServiceUnavailable,
            format!("{context}: database pool timed out"),
            e,
        ),
        _ => AppError::with_source(ErrorKind::StoreError, context, e),
    }
}

/// Name of the violated unique constraint, if `e` is a unique violation.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<&str> {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
