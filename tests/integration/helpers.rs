//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use warden_api::{AppState, build_app};
use warden_core::config::{
    AppConfig, AppSection, AuthConfig, DatabaseConfig, Environment, LoggingConfig,
    RateLimitConfig, ServerConfig, SsoConfig,
};
use warden_core::types::PageRequest;
use warden_database::{AuditStore, CredentialStore, MemoryStore};
use warden_entity::audit::{AuditFilter, AuditLogEntry};
use warden_entity::user::{CreateUser, UpdateUser, User, UserRole};

pub const SSO_SECRET: &str = "integration-sso-secret-0123456789";
pub const SSO_CLIENT_ID: &str = "warden-app";

/// Configuration that needs no database and no files.
pub fn test_config(environment: Environment) -> AppConfig {
    AppConfig {
        app: AppSection {
            environment,
            service_code: "0001".to_string(),
        },
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused@localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        auth: AuthConfig::with_secrets(
            "integration-access-secret-0123456789",
            "integration-refresh-secret-0123456789",
        ),
        sso: SsoConfig {
            enabled: true,
            client_id: Some(SSO_CLIENT_ID.to_string()),
            client_secret: Some(SSO_SECRET.to_string()),
            service_url: Some("https://sso.example.com".to_string()),
        },
        rate_limit: RateLimitConfig::disabled(),
        logging: LoggingConfig::default(),
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: MemoryStore,
    /// Shared state
    pub state: AppState,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when empty
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` member of an error envelope.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// Tokens returned by a login.
pub struct Session {
    pub access: String,
    pub refresh: String,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config(Environment::Test))
    }

    /// Create a test application with a specific configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let state = AppState::new(config, Arc::new(store.clone()));
        let router = build_app(state.clone());
        Self {
            router,
            store,
            state,
        }
    }

    /// Versioned API path.
    pub fn path(&self, suffix: &str) -> String {
        format!("/api/{}{}", self.state.config.server.api_version, suffix)
    }

    /// Create a user directly in the store
    pub async fn create_user(&self, email: &str, password: &str, role: UserRole) -> User {
        let hash = self
            .state
            .tokens
            .hasher()
            .hash_password(password)
            .expect("Failed to hash password");
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
            .expect("Failed to create test user")
    }

    /// Seed the demo admin and log in as it
    pub async fn admin(&self) -> (User, Session) {
        let user = self
            .create_user("admin@example.com", "admin123", UserRole::Admin)
            .await;
        let session = self.login("admin@example.com", "admin123").await;
        (user, session)
    }

    /// Seed a regular user and log in as it
    pub async fn member(&self, email: &str) -> (User, Session) {
        let user = self.create_user(email, "password123", UserRole::User).await;
        let session = self.login(email, "password123").await;
        (user, session)
    }

    /// Flip a user's active flag
    pub async fn set_active(&self, user: &User, active: bool) {
        self.store
            .update_user(
                user.id,
                &UpdateUser {
                    is_active: Some(active),
                    ..UpdateUser::default()
                },
            )
            .await
            .expect("Failed to update user");
    }

    /// Login and return both tokens
    pub async fn login(&self, email: &str, password: &str) -> Session {
        let response = self
            .request(
                "POST",
                &self.path("/auth/login"),
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        let token = |key: &str| {
            response.data()[key]
                .as_str()
                .unwrap_or_else(|| panic!("No {key} in login response"))
                .to_string()
        };
        Session {
            access: token("accessToken"),
            refresh: token("refreshToken"),
        }
    }

    /// Sign an external SSO token
    pub fn sso_token(&self, claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SSO_SECRET.as_bytes()),
        )
        .expect("Failed to sign SSO token")
    }

    /// Wait until the background audit writer has recorded `at_least`
    /// entries for `user_id`, newest first.
    pub async fn wait_for_audit(&self, user_id: Uuid, at_least: usize) -> Vec<AuditLogEntry> {
        let filter = AuditFilter {
            user_id: Some(user_id),
            ..AuditFilter::default()
        };
        for _ in 0..100 {
            let page = self
                .store
                .search(&filter, &PageRequest::new(1, 100))
                .await
                .expect("Failed to read audit log");
            if page.items.len() >= at_least {
                return page.items;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("audit entries did not appear");
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("User-Agent", "warden-tests")
            .header("X-Forwarded-For", "198.51.100.4");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Send a prepared request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
