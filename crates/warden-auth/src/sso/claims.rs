//! Claims carried by externally issued SSO tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use warden_entity::user::UserRole;

/// The `aud` claim, which may be a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// `"aud": "app"`
    One(String),
    /// `"aud": ["app", "other"]`
    Many(Vec<String>),
}

impl Audience {
    /// Whether `expected` is among the audiences.
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Self::One(aud) => aud == expected,
            Self::Many(auds) => auds.iter().any(|a| a == expected),
        }
    }
}

/// Raw payload as signed by the SSO service. Every field is optional here;
/// presence of the required ones is checked after the signature.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalClaims {
    /// Subject id as the SSO service names it.
    #[serde(rename = "userId", default)]
    pub user_id: Option<Value>,
    /// Standard subject, accepted when `userId` is absent.
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub aud: Option<Audience>,
    /// Expiry as a NumericDate, possibly fractional. Tokens without one
    /// do not expire.
    #[serde(default)]
    pub exp: Option<f64>,
}

impl ExternalClaims {
    /// Whether `now` is at or past `exp`, to the millisecond.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp
            .is_some_and(|exp| now.timestamp_millis() as f64 / 1000.0 >= exp)
    }

    /// The external subject id, from `userId` (string or number) or `sub`.
    pub fn subject(&self) -> Option<String> {
        let from_user_id = match &self.user_id {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        from_user_id.or_else(|| self.sub.clone().filter(|s| !s.trim().is_empty()))
    }
}

/// Claims after validation and normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoIdentity {
    /// Subject id in the SSO service.
    pub id: String,
    /// Lower-cased email.
    pub email: String,
    /// Claimed username, or the email local part.
    pub username: String,
    /// Full name, if claimed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Claimed role.
    pub role: UserRole,
    /// Claimed permission codes. Informational only; local grants decide.
    pub permissions: Vec<String>,
    /// Opaque extra data from the SSO service.
    pub metadata: Value,
}
