//! SSO bridge: trust an externally signed token and map it to a local user.

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_core::config::{AuthConfig, SsoConfig};
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::Clock;
use warden_database::CredentialStore;
use warden_entity::audit::AuditAction;
use warden_entity::user::{CreateUser, User, UserRole};

use super::claims::{ExternalClaims, SsoIdentity};
use crate::audit::{AuditEvent, AuditSink, ClientContext};
use crate::deadline::StoreDeadline;
use crate::jwt::decoder::{any_hmac, decode_claims};
use crate::token::{LoginResult, TokenService};

/// Username attempts before provisioning gives up.
const MAX_PROVISION_ATTEMPTS: usize = 3;

/// Outcome of validating an external token.
#[derive(Debug, Clone, PartialEq)]
pub enum SsoVerification {
    /// Token accepted; claims normalized.
    Valid(SsoIdentity),
    /// Token refused, with the reason.
    Rejected {
        /// Stable failure kind.
        kind: ErrorKind,
        /// Human message.
        message: String,
    },
}

impl SsoVerification {
    fn reject(kind: ErrorKind, message: &str) -> Self {
        Self::Rejected {
            kind,
            message: message.to_string(),
        }
    }

    /// Whether the token was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Converts a rejection into an error of the same kind.
    pub fn into_result(self) -> AppResult<SsoIdentity> {
        match self {
            Self::Valid(identity) => Ok(identity),
            Self::Rejected { kind, message } => Err(AppError::new(kind, message)),
        }
    }
}

/// Public view of the SSO configuration. Carries no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoInfo {
    pub enabled: bool,
    pub service_url: Option<String>,
    pub has_client_id: bool,
    pub has_client_secret: bool,
    pub configured: bool,
}

/// Validates SSO tokens and auto-provisions local users.
#[derive(Clone)]
pub struct SsoBridge {
    enabled: bool,
    audience: Option<String>,
    service_url: Option<String>,
    key: Option<DecodingKey>,
    validation: Validation,
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
    audit: Arc<dyn AuditSink>,
    deadline: StoreDeadline,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SsoBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoBridge")
            .field("enabled", &self.enabled)
            .field("audience", &self.audience)
            .field("configured", &self.key.is_some())
            .finish()
    }
}

impl SsoBridge {
    /// Creates the bridge. The shared secret is read once here.
    pub fn new(
        sso: &SsoConfig,
        auth: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        tokens: TokenService,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            enabled: sso.enabled,
            audience: sso.audience().map(str::to_string),
            service_url: sso.service_url.clone(),
            key: sso.secret().map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation: any_hmac(),
            store,
            tokens,
            audit,
            deadline: StoreDeadline::new(auth.store_timeout()),
            clock,
        }
    }

    /// Configuration summary for clients.
    pub fn info(&self) -> SsoInfo {
        SsoInfo {
            enabled: self.enabled,
            service_url: self.service_url.clone(),
            has_client_id: self.audience.is_some(),
            has_client_secret: self.key.is_some(),
            configured: self.enabled && self.key.is_some(),
        }
    }

    /// Validates an external token and normalizes its claims.
    ///
    /// Checks, in order: feature flag, shared secret, signature, expiry,
    /// required claims (subject, email, role), audience.
    pub fn process_external_token(&self, token: &str) -> SsoVerification {
        if !self.enabled {
            return SsoVerification::reject(ErrorKind::SsoDisabled, "SSO authentication is disabled");
        }
        let Some(key) = &self.key else {
            return SsoVerification::reject(
                ErrorKind::SsoNotConfigured,
                "SSO client secret is not configured",
            );
        };

        let Some(claims) = decode_claims::<ExternalClaims>(token, key, &self.validation) else {
            return SsoVerification::reject(ErrorKind::InvalidToken, "Invalid SSO token signature");
        };

        if claims.is_expired_at(self.clock.now()) {
            return SsoVerification::reject(ErrorKind::TokenExpired, "SSO token has expired");
        }

        let email = claims
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let (Some(id), Some(email), Some(role)) = (claims.subject(), email, claims.role.as_deref())
        else {
            return SsoVerification::reject(
                ErrorKind::InvalidPayload,
                "SSO token missing required fields (userId, email, role)",
            );
        };
        let Ok(role) = role.parse::<UserRole>() else {
            return SsoVerification::reject(ErrorKind::InvalidPayload, "SSO token carries an unknown role");
        };

        if let (Some(expected), Some(aud)) = (&self.audience, &claims.aud) {
            if !aud.contains(expected) {
                return SsoVerification::reject(
                    ErrorKind::InvalidAudience,
                    "SSO token is not intended for this application",
                );
            }
        }

        let email = email.to_lowercase();
        let username = claims
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| local_part(&email).to_string());

        SsoVerification::Valid(SsoIdentity {
            id,
            email,
            username,
            full_name: claims.full_name,
            role,
            permissions: claims.permissions.unwrap_or_default(),
            metadata: claims
                .metadata
                .unwrap_or_else(|| Value::Object(Default::default())),
        })
    }

    /// Validates without touching local state.
    pub fn verify(&self, token: &str) -> AppResult<SsoIdentity> {
        self.process_external_token(token)
            .into_result()
            .inspect_err(|e| debug!(kind = %e.kind, "SSO token rejected"))
    }

    /// Logs in with an external token, provisioning the local user on
    /// first sight.
    pub async fn sso_login(&self, token: &str, client: &ClientContext) -> AppResult<LoginResult> {
        // Step 1: Validate external token
        let identity = self.process_external_token(token).into_result().inspect_err(|e| {
            warn!(operation = "sso_login", kind = %e.kind, "SSO token rejected");
        })?;

        // Step 2: Resolve or provision the local user
        let user = self.resolve_user(&identity, client).await?;

        // Step 3: Check account state
        if !user.is_active {
            warn!(user_id = %user.id, operation = "sso_login", "SSO login rejected for inactive user");
            return Err(AppError::forbidden("User account is inactive"));
        }

        // Step 4: Issue tokens
        let tokens = self.tokens.open_session(&user).await?;

        self.audit.record(
            AuditEvent::new(AuditAction::Login, "User")
                .by(user.id)
                .target(user.id)
                .detail(format!("SSO login successful: {}", user.email))
                .from_client(client),
        );
        info!(user_id = %user.id, "SSO login successful");

        Ok(LoginResult {
            tokens,
            user: user.profile(),
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.deadline
            .run("find_user_by_email", self.store.find_user_by_email(email))
            .await
    }

    /// A uniqueness violation on insert means another request got there
    /// first: re-read by email. If the email is still free the collision was
    /// on the username, so retry with a suffix.
    async fn resolve_user(&self, identity: &SsoIdentity, client: &ClientContext) -> AppResult<User> {
        if let Some(user) = self.find_by_email(&identity.email).await? {
            return Ok(user);
        }

        let mut username = identity.username.clone();
        for _ in 0..MAX_PROVISION_ATTEMPTS {
            let created = self
                .deadline
                .run(
                    "create_user",
                    self.store.create_user(&CreateUser {
                        email: identity.email.clone(),
                        username: username.clone(),
                        password_hash: None,
                        full_name: identity.full_name.clone(),
                        role: identity.role,
                    }),
                )
                .await;

            match created {
                Ok(user) => {
                    self.audit.record(
                        AuditEvent::new(AuditAction::Register, "User")
                            .by(user.id)
                            .target(user.id)
                            .detail(format!("SSO user auto-provisioned: {}", user.email))
                            .from_client(client),
                    );
                    info!(user_id = %user.id, role = %user.role, "SSO user auto-provisioned");
                    return Ok(user);
                }
                Err(e) if e.is(ErrorKind::DuplicateEntry) => {
                    if let Some(user) = self.find_by_email(&identity.email).await? {
                        debug!(user_id = %user.id, "SSO user provisioned concurrently");
                        return Ok(user);
                    }
                    username = format!("{}_{}", identity.username, short_suffix());
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::duplicate(
            "Could not allocate a unique username for SSO user",
        ))
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

fn short_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..6].to_string()
}
