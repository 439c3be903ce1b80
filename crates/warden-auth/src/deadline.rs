//! Caller-supplied deadline for store access.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Upper bound on a single store call.
///
/// Elapsing surfaces as `ServiceUnavailable`, which is retryable and never
/// stands in for the business outcome of the call.
#[derive(Debug, Clone, Copy)]
pub struct StoreDeadline {
    limit: Duration,
}

impl StoreDeadline {
    /// A deadline of `limit` per call.
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// The configured limit.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Runs `fut`, failing with `ServiceUnavailable` if it does not finish in time.
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.limit.as_millis() as u64,
                    "Store call exceeded deadline"
                );
                Err(AppError::service_unavailable(format!(
                    "Store did not respond in time ({operation})"
                )))
            }
        }
    }
}
