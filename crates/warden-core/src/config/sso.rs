//! External single sign-on configuration.

use serde::{Deserialize, Serialize};

/// Settings for accepting tokens issued by the external SSO service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoConfig {
    /// Whether SSO login is accepted at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Expected audience of incoming tokens.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Shared secret the SSO service signs with.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Base URL of the SSO service, reported to clients.
    #[serde(default)]
    pub service_url: Option<String>,
}

impl SsoConfig {
    /// The shared secret, if one is set and non-empty.
    pub fn secret(&self) -> Option<&str> {
        self.client_secret.as_deref().filter(|s| !s.is_empty())
    }

    /// The expected audience, if one is set and non-empty.
    pub fn audience(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|s| !s.is_empty())
    }
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            client_id: None,
            client_secret: None,
            service_url: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}
