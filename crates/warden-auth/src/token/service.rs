//! Token service: login, refresh rotation, logout and registration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use warden_core::config::AuthConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::Clock;
use warden_database::CredentialStore;
use warden_entity::audit::AuditAction;
use warden_entity::token::{NewRefreshToken, RefreshTokenState};
use warden_entity::user::{CreateUser, User, UserProfile, UserRole};

use super::token_digest;
use crate::audit::{AuditEvent, AuditSink, ClientContext};
use crate::deadline::StoreDeadline;
use crate::jwt::{JwtDecoder, JwtEncoder, TokenType};
use crate::password::{PasswordHasher, PasswordValidator};

/// An access token and the refresh token that can renew it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Result of a successful password or SSO login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// Issued tokens.
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user: UserProfile,
}

/// Input for self-registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Email address.
    pub email: String,
    /// Desired username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Full name.
    pub full_name: Option<String>,
}

/// Mints, verifies and rotates tokens against the credential store.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn CredentialStore>,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    audit: Arc<dyn AuditSink>,
    deadline: StoreDeadline,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("encoder", &self.encoder)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl TokenService {
    /// Creates a token service with all required dependencies.
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            encoder: JwtEncoder::new(config, clock.clone()),
            decoder: JwtDecoder::new(config, clock.clone()),
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(config),
            audit,
            deadline: StoreDeadline::new(config.store_timeout()),
            clock,
        }
    }

    /// The password hasher, shared with callers that create accounts.
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// The password policy.
    pub fn validator(&self) -> &PasswordValidator {
        &self.validator
    }

    /// The token decoder.
    pub fn decoder(&self) -> &JwtDecoder {
        &self.decoder
    }

    /// Signs a short-lived access token for `user`. No I/O.
    pub fn issue_access_token(&self, user: &User) -> AppResult<String> {
        self.encoder
            .issue(user.id, &user.email, user.role, TokenType::Access)
            .map(|t| t.token)
    }

    /// Signs a long-lived refresh token for `user`. No I/O.
    pub fn issue_refresh_token(&self, user: &User) -> AppResult<String> {
        self.encoder
            .issue(user.id, &user.email, user.role, TokenType::Refresh)
            .map(|t| t.token)
    }

    /// Authenticates by email and password.
    ///
    /// Absent, inactive and mismatched accounts all fail with the same
    /// `InvalidCredentials`, and all of them pay for one Argon2 verification.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientContext,
    ) -> AppResult<LoginResult> {
        let email = email.trim().to_lowercase();

        // Step 1: Find user
        let user = self
            .deadline
            .run("find_user_by_email", self.store.find_user_by_email(&email))
            .await?;

        // Step 2: Verify password, even when there is nothing to verify against
        let stored_hash = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let password_ok = self.hasher.verify_optional(password, stored_hash)?;

        // Step 3: Check account state
        let user = match user {
            Some(user) if user.is_active && password_ok => user,
            Some(user) => {
                warn!(
                    user_id = %user.id,
                    operation = "login",
                    inactive = !user.is_active,
                    "Login rejected"
                );
                return Err(AppError::invalid_credentials());
            }
            None => {
                warn!(operation = "login", "Login rejected for unknown email");
                return Err(AppError::invalid_credentials());
            }
        };

        // Step 4: Issue and persist tokens
        let tokens = self.open_session(&user).await?;

        self.audit.record(
            AuditEvent::new(AuditAction::Login, "User")
                .by(user.id)
                .target(user.id)
                .detail(format!("User logged in: {}", user.email))
                .from_client(client),
        );
        info!(user_id = %user.id, "Login successful");

        Ok(LoginResult {
            tokens,
            user: user.profile(),
        })
    }

    /// Exchanges a refresh token for a new pair, revoking the presented one.
    ///
    /// Signature and expiry are checked before any store access. The stored
    /// record is authoritative for revocation and expiry. Rotation is a
    /// single store transition; of concurrent refreshes with the same token
    /// exactly one succeeds and the rest fail with `InvalidToken`.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        // Step 1: Stateless check
        let claims = self
            .decoder
            .verify_refresh(refresh_token)
            .into_result("Refresh token")?;

        // Step 2: Stored record
        let digest = token_digest(refresh_token);
        let record = self
            .deadline
            .run("find_refresh_token", self.store.find_refresh_token(&digest))
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, operation = "refresh", "Refresh token not on record");
                AppError::invalid_token("Invalid or revoked refresh token")
            })?;

        if record.user_id != claims.sub {
            warn!(user_id = %claims.sub, operation = "refresh", "Refresh token owner mismatch");
            return Err(AppError::invalid_token("Invalid or revoked refresh token"));
        }

        match record.state_at(self.clock.now()) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Revoked => {
                warn!(user_id = %record.user_id, operation = "refresh", "Revoked refresh token presented");
                return Err(AppError::invalid_token("Invalid or revoked refresh token"));
            }
            RefreshTokenState::Expired => {
                return Err(AppError::token_expired("Refresh token has expired"));
            }
        }

        // Step 3: Owner must still be active
        let user = self
            .deadline
            .run("find_user_by_id", self.store.find_user_by_id(record.user_id))
            .await?
            .ok_or_else(|| AppError::invalid_token("Invalid or revoked refresh token"))?;
        if !user.is_active {
            warn!(user_id = %user.id, operation = "refresh", "Refresh rejected for inactive user");
            return Err(AppError::forbidden("User is inactive"));
        }

        // Step 4: Rotate
        let access = self
            .encoder
            .issue(user.id, &user.email, user.role, TokenType::Access)?;
        let refresh = self
            .encoder
            .issue(user.id, &user.email, user.role, TokenType::Refresh)?;
        let next = NewRefreshToken {
            token_hash: token_digest(&refresh.token),
            user_id: user.id,
            expires_at: self.clock.now() + self.encoder.refresh_ttl(),
        };

        let stored = self
            .deadline
            .run(
                "rotate_refresh_token",
                self.store.rotate_refresh_token(record.id, &next),
            )
            .await
            .inspect_err(|e| {
                if e.is(ErrorKind::InvalidToken) {
                    warn!(user_id = %user.id, operation = "refresh", "Lost refresh rotation race");
                }
            })?;

        info!(user_id = %user.id, "Refresh token rotated");

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.claims.expires_at(),
            refresh_expires_at: stored.expires_at,
        })
    }

    /// Revokes every stored record matching `refresh_token`.
    ///
    /// Unknown or already revoked tokens are not an error.
    pub async fn logout(&self, refresh_token: &str, client: &ClientContext) -> AppResult<()> {
        if refresh_token.is_empty() {
            return Ok(());
        }
        let digest = token_digest(refresh_token);

        let owner = self
            .deadline
            .run("find_refresh_token", self.store.find_refresh_token(&digest))
            .await?
            .map(|r| r.user_id);

        let revoked = self
            .deadline
            .run("revoke_refresh_token", self.store.revoke_refresh_token(&digest))
            .await?;

        if let Some(user_id) = owner {
            if revoked > 0 {
                self.audit.record(
                    AuditEvent::new(AuditAction::Logout, "User")
                        .by(user_id)
                        .target(user_id)
                        .detail("User logged out")
                        .from_client(client),
                );
            }
            info!(user_id = %user_id, revoked, "Logout processed");
        }
        Ok(())
    }

    /// Creates an active USER account. No tokens are issued.
    pub async fn register(
        &self,
        registration: Registration,
        client: &ClientContext,
    ) -> AppResult<UserProfile> {
        self.validator.validate(&registration.password)?;
        let email = registration.email.trim().to_lowercase();

        let by_email = self
            .deadline
            .run("find_user_by_email", self.store.find_user_by_email(&email))
            .await?;
        let by_username = self
            .deadline
            .run(
                "find_user_by_username",
                self.store.find_user_by_username(&registration.username),
            )
            .await?;
        if by_email.is_some() || by_username.is_some() {
            return Err(AppError::duplicate("Email or username already exists"));
        }

        let password_hash = self.hasher.hash_password(&registration.password)?;
        let user = self
            .deadline
            .run(
                "create_user",
                self.store.create_user(&CreateUser {
                    email,
                    username: registration.username,
                    password_hash: Some(password_hash),
                    full_name: registration.full_name,
                    role: UserRole::User,
                }),
            )
            .await?;

        self.audit.record(
            AuditEvent::new(AuditAction::Register, "User")
                .by(user.id)
                .target(user.id)
                .detail(format!("User registered: {}", user.email))
                .from_client(client),
        );
        info!(user_id = %user.id, "User registered");

        Ok(user.profile())
    }

    /// Mints a pair for `user` and persists the refresh record.
    pub(crate) async fn open_session(&self, user: &User) -> AppResult<TokenPair> {
        let access = self
            .encoder
            .issue(user.id, &user.email, user.role, TokenType::Access)?;
        let refresh = self
            .encoder
            .issue(user.id, &user.email, user.role, TokenType::Refresh)?;

        let record = self
            .deadline
            .run(
                "create_refresh_token",
                self.store.create_refresh_token(&NewRefreshToken {
                    token_hash: token_digest(&refresh.token),
                    user_id: user.id,
                    expires_at: self.clock.now() + self.encoder.refresh_ttl(),
                }),
            )
            .await?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.claims.expires_at(),
            refresh_expires_at: record.expires_at,
        })
    }
}
