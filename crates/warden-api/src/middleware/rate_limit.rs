//! Fixed-window request quotas keyed by client address.
//!
//! Each limiter keeps one counter per address in a moka cache whose
//! time-to-live equals the window, so a counter disappears when its
//! window closes and the next request opens a fresh one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::future::Cache;
use tracing::warn;

use warden_core::config::{RateLimitConfig, RateLimitRule};
use warden_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::ClientInfo;

const MAX_TRACKED_CLIENTS: u64 = 100_000;

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
const RATELIMIT_RESET: &str = "ratelimit-reset";

#[derive(Debug)]
struct Window {
    opened: Instant,
    hits: AtomicU32,
}

/// Result of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Whether the request fits in the current window.
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the window closes.
    pub reset: Duration,
}

/// One named quota.
#[derive(Clone)]
pub struct RateLimiter {
    name: &'static str,
    message: &'static str,
    enabled: bool,
    rule: RateLimitRule,
    windows: Cache<String, Arc<Window>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("rule", &self.rule)
            .finish()
    }
}

impl RateLimiter {
    /// Creates a limiter; `message` is returned to throttled clients.
    pub fn new(name: &'static str, rule: RateLimitRule, enabled: bool, message: &'static str) -> Self {
        Self {
            name,
            message,
            enabled,
            rule,
            windows: Cache::builder()
                .max_capacity(MAX_TRACKED_CLIENTS)
                .time_to_live(rule.window())
                .build(),
        }
    }

    /// Counts a request from `client` against its current window.
    pub async fn hit(&self, client: &str) -> Quota {
        let window = self
            .windows
            .get_with(client.to_string(), async {
                Arc::new(Window {
                    opened: Instant::now(),
                    hits: AtomicU32::new(0),
                })
            })
            .await;
        let hits = window.hits.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        Quota {
            allowed: hits <= self.rule.max,
            limit: self.rule.max,
            remaining: self.rule.max.saturating_sub(hits),
            reset: self.rule.window().saturating_sub(window.opened.elapsed()),
        }
    }
}

/// Every limiter the router applies.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub global: RateLimiter,
    pub login: RateLimiter,
    pub register: RateLimiter,
    pub refresh: RateLimiter,
    pub crud: RateLimiter,
}

impl RateLimits {
    /// Builds the limiters from configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        let on = config.enabled;
        Self {
            global: RateLimiter::new(
                "global",
                config.global,
                on,
                "Too many requests from this IP, please try again later",
            ),
            login: RateLimiter::new(
                "login",
                config.login,
                on,
                "Too many login attempts, please try again after a minute",
            ),
            register: RateLimiter::new(
                "register",
                config.register,
                on,
                "Too many registration attempts, please try again after a minute",
            ),
            refresh: RateLimiter::new(
                "refresh",
                config.refresh,
                on,
                "Too many token refresh attempts, please try again after a minute",
            ),
            crud: RateLimiter::new("crud", config.crud, on, "Too many requests, please slow down"),
        }
    }
}

/// Rejects the request with 429 once the client's window is spent.
///
/// Layer with `from_fn_with_state(limiter, enforce)`.
pub async fn enforce(
    State(limiter): State<RateLimiter>,
    client: ClientInfo,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.enabled {
        return next.run(request).await;
    }

    let key = client.ip.as_deref().unwrap_or("unknown");
    let quota = limiter.hit(key).await;
    if !quota.allowed {
        warn!(limiter = limiter.name, client = key, "Rate limit exceeded");
        let mut response = ApiError::from(AppError::too_many_requests(limiter.message)).into_response();
        stamp(&mut response, &quota);
        response.headers_mut().insert(
            header::RETRY_AFTER,
            HeaderValue::from(reset_seconds(&quota)),
        );
        return response;
    }

    let mut response = next.run(request).await;
    stamp(&mut response, &quota);
    response
}

fn reset_seconds(quota: &Quota) -> u64 {
    quota.reset.as_secs() + u64::from(quota.reset.subsec_nanos() > 0)
}

/// Adds quota headers unless a more specific limiter already set them.
fn stamp(response: &mut Response, quota: &Quota) {
    let headers = response.headers_mut();
    let values = [
        (RATELIMIT_LIMIT, u64::from(quota.limit)),
        (RATELIMIT_REMAINING, u64::from(quota.remaining)),
        (RATELIMIT_RESET, reset_seconds(quota)),
    ];
    for (name, value) in values {
        headers
            .entry(HeaderName::from_static(name))
            .or_insert_with(|| HeaderValue::from(value));
    }
}
