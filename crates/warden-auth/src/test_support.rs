//! Shared fixtures for unit tests.

use std::sync::Arc;

use warden_core::config::{AuthConfig, SsoConfig};
use warden_core::types::ManualClock;
use warden_database::{CredentialStore, MemoryStore};
use warden_entity::user::{CreateUser, UpdateUser, User, UserRole};

use crate::audit::TracingAuditSink;
use crate::rbac::AuthorizationGate;
use crate::sso::SsoBridge;
use crate::token::TokenService;

pub(crate) const ACCESS_SECRET: &str = "test-access-secret-0123456789abcdef";
pub(crate) const REFRESH_SECRET: &str = "test-refresh-secret-0123456789abcdef";
pub(crate) const SSO_SECRET: &str = "test-sso-shared-secret-0123456789";

pub(crate) struct Fixture {
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
    pub config: AuthConfig,
    pub tokens: TokenService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(AuthConfig::with_secrets(ACCESS_SECRET, REFRESH_SECRET))
    }

    pub fn with_config(config: AuthConfig) -> Self {
        let store = MemoryStore::new();
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = TokenService::new(
            &config,
            Arc::new(store.clone()),
            Arc::new(TracingAuditSink),
            clock.clone(),
        );
        Self {
            store,
            clock,
            config,
            tokens,
        }
    }

    pub fn gate(&self) -> AuthorizationGate {
        AuthorizationGate::new(&self.config, Arc::new(self.store.clone()), self.clock.clone())
    }

    pub fn sso(&self, sso: SsoConfig) -> SsoBridge {
        SsoBridge::new(
            &sso,
            &self.config,
            Arc::new(self.store.clone()),
            self.tokens.clone(),
            Arc::new(TracingAuditSink),
            self.clock.clone(),
        )
    }

    pub async fn user(&self, email: &str, password: &str, role: UserRole) -> User {
        let hash = self.tokens.hasher().hash_password(password).unwrap();
        let username = email.split('@').next().unwrap_or(email).to_string();
        self.store
            .create_user(&CreateUser {
                email: email.to_string(),
                username,
                password_hash: Some(hash),
                full_name: None,
                role,
            })
            .await
            .unwrap()
    }

    pub async fn deactivate(&self, user: &User) {
        self.store
            .update_user(
                user.id,
                &UpdateUser {
                    is_active: Some(false),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap();
    }
}

pub(crate) fn sso_config() -> SsoConfig {
    SsoConfig {
        enabled: true,
        client_id: Some("warden-app".into()),
        client_secret: Some(SSO_SECRET.into()),
        service_url: Some("https://sso.example.com".into()),
    }
}
