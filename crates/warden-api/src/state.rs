//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use warden_auth::{
    AuditSink, AuthorizationGate, SsoBridge, StoreAuditSink, StoreDeadline, TokenService,
};
use warden_core::config::AppConfig;
use warden_core::types::{Clock, PageResponse, SystemClock};
use warden_database::{AuditStore, CredentialStore, PostStore};

use crate::dto::{ApiResponse, Reply, SuccessCode};
use crate::middleware::RateLimits;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Stores ───────────────────────────────────────────────
    /// Users, refresh tokens and permissions
    pub credentials: Arc<dyn CredentialStore>,
    /// Posts
    pub posts: Arc<dyn PostStore>,
    /// Audit log reads
    pub audit_log: Arc<dyn AuditStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Login, refresh, logout and registration
    pub tokens: TokenService,
    /// External SSO token handling
    pub sso: SsoBridge,
    /// Bearer authentication and scope checks
    pub gate: AuthorizationGate,
    /// Fire-and-forget audit recorder
    pub audit: Arc<dyn AuditSink>,
    /// Deadline applied to store calls made directly by handlers
    pub deadline: StoreDeadline,

    // ── Traffic ──────────────────────────────────────────────
    /// Per-client request quotas
    pub limits: RateLimits,

    /// When the process started serving
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.app.environment)
            .field("tokens", &self.tokens)
            .field("gate", &self.gate)
            .finish()
    }
}

impl AppState {
    /// Wires every component against one store that backs all three
    /// store traits, using the wall clock.
    pub fn new<S>(config: AppConfig, store: Arc<S>) -> Self
    where
        S: CredentialStore + PostStore + AuditStore,
    {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Same as [`AppState::new`] with an explicit clock.
    pub fn with_clock<S>(config: AppConfig, store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: CredentialStore + PostStore + AuditStore,
    {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let posts: Arc<dyn PostStore> = store.clone();
        let audit_log: Arc<dyn AuditStore> = store;

        let deadline = StoreDeadline::new(config.auth.store_timeout());
        let audit: Arc<dyn AuditSink> =
            Arc::new(StoreAuditSink::new(audit_log.clone(), deadline));

        let tokens = TokenService::new(
            &config.auth,
            credentials.clone(),
            audit.clone(),
            clock.clone(),
        );
        let sso = SsoBridge::new(
            &config.sso,
            &config.auth,
            credentials.clone(),
            tokens.clone(),
            audit.clone(),
            clock.clone(),
        );
        let gate = AuthorizationGate::new(&config.auth, credentials.clone(), clock);
        let limits = RateLimits::new(&config.rate_limit);

        Self {
            config: Arc::new(config),
            credentials,
            posts,
            audit_log,
            tokens,
            sso,
            gate,
            audit,
            deadline,
            limits,
            started_at: Instant::now(),
        }
    }

    /// Four-digit code appended to every response code.
    pub fn service_code(&self) -> &str {
        &self.config.app.service_code
    }

    /// Wraps `data` in the success envelope.
    pub fn respond<T: Serialize>(
        &self,
        outcome: SuccessCode,
        message: impl Into<String>,
        data: T,
    ) -> Reply<T> {
        ApiResponse::new(outcome, self.service_code(), message, data).reply(outcome)
    }

    /// Wraps one page of results in the success envelope.
    pub fn respond_page<T: Serialize>(
        &self,
        message: impl Into<String>,
        page: PageResponse<T>,
    ) -> Reply<Vec<T>> {
        ApiResponse::page(self.service_code(), message, page).reply(SuccessCode::Success)
    }
}
