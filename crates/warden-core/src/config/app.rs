//! Deployment, server and CORS configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Where the service is running. Controls error detail exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; error details are exposed.
    #[default]
    Development,
    /// Production deployment.
    Production,
    /// Automated tests.
    Test,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Deployment-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    /// Running environment.
    #[serde(default)]
    pub environment: Environment,
    /// Four-digit service code appended to every response code.
    #[serde(default = "default_service_code")]
    pub service_code: String,
}

impl AppSection {
    /// Whether internal error details may be shown to clients.
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.service_code.len() != 4 || !self.service_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::configuration(format!(
                "app.service_code must be exactly 4 digits, got '{}'",
                self.service_code
            )));
        }
        Ok(())
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            service_code: default_service_code(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Version segment routes are mounted under (`/api/{api_version}`).
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_version: default_api_version(),
            request_timeout_seconds: default_request_timeout(),
            shutdown_grace_seconds: default_shutdown_grace(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins (use `["*"]` for development only).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods.
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,
    /// Allowed HTTP headers.
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_service_code() -> String {
    "0001".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_allowed_headers() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_age() -> u64 {
    3600
}
