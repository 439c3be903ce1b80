//! Per-client request quotas.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A fixed-window quota: at most `max` requests per `window_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub max: u32,
    pub window_seconds: u64,
}

impl RateLimitRule {
    /// Creates a rule.
    pub const fn new(max: u32, window_seconds: u64) -> Self {
        Self {
            max,
            window_seconds,
        }
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// `[rate_limit]` section. Clients are keyed by address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// When off, no quota is enforced anywhere.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Every request under `/api`.
    #[serde(default = "default_global")]
    pub global: RateLimitRule,
    /// Password and SSO login.
    #[serde(default = "default_login")]
    pub login: RateLimitRule,
    #[serde(default = "default_register")]
    pub register: RateLimitRule,
    #[serde(default = "default_refresh")]
    pub refresh: RateLimitRule,
    /// User, post and audit-log resources.
    #[serde(default = "default_crud")]
    pub crud: RateLimitRule,
}

impl RateLimitConfig {
    /// Default quotas with enforcement switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            global: default_global(),
            login: default_login(),
            register: default_register(),
            refresh: default_refresh(),
            crud: default_crud(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_global() -> RateLimitRule {
    RateLimitRule::new(1000, 15 * 60)
}

fn default_login() -> RateLimitRule {
    RateLimitRule::new(5, 60)
}

fn default_register() -> RateLimitRule {
    RateLimitRule::new(3, 60)
}

fn default_refresh() -> RateLimitRule {
    RateLimitRule::new(10, 60)
}

fn default_crud() -> RateLimitRule {
    RateLimitRule::new(100, 60)
}
