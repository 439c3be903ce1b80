//! Per-request authorization decisions.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::Clock;
use warden_database::CredentialStore;
use warden_entity::user::UserRole;

use super::identity::Identity;
use crate::deadline::StoreDeadline;
use crate::jwt::JwtDecoder;

/// Permission codes held by a role.
pub type PermissionSet = Arc<HashSet<String>>;

/// Combines authenticated identity, role and permission scopes into
/// allow/deny.
///
/// Role→codes sets may be cached for `permission_cache_ttl_seconds`; active
/// status is always re-read from the store.
#[derive(Clone)]
pub struct AuthorizationGate {
    store: Arc<dyn CredentialStore>,
    decoder: JwtDecoder,
    deadline: StoreDeadline,
    cache: Option<Cache<UserRole, PermissionSet>>,
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("deadline", &self.deadline)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl AuthorizationGate {
    /// Creates the gate.
    pub fn new(config: &AuthConfig, store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        let cache = (config.permission_cache_ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(UserRole::ALL.len() as u64)
                .time_to_live(Duration::from_secs(config.permission_cache_ttl_seconds))
                .build()
        });
        Self {
            store,
            decoder: JwtDecoder::new(config, clock),
            deadline: StoreDeadline::new(config.store_timeout()),
            cache,
        }
    }

    /// Verifies an access token and confirms the user is still active.
    pub async fn authenticate(&self, bearer_token: &str) -> AppResult<Identity> {
        let claims = self
            .decoder
            .verify_access(bearer_token)
            .into_result("Token")?;

        let user = self
            .deadline
            .run("find_user_by_id", self.store.find_user_by_id(claims.sub))
            .await?;

        match user {
            Some(user) if user.is_active => Ok(Identity::from(&user)),
            _ => {
                warn!(user_id = %claims.sub, operation = "authenticate", "User not found or inactive");
                Err(AppError::unauthorized("User not found or inactive"))
            }
        }
    }

    /// Any authenticated identity passes.
    pub fn authorize_any(&self, _identity: &Identity) -> AppResult<()> {
        Ok(())
    }

    /// Passes if the role holds at least one of `required`. An empty list
    /// always passes.
    pub async fn authorize_scope(&self, identity: &Identity, required: &[&str]) -> AppResult<()> {
        if required.is_empty() {
            return Ok(());
        }
        let granted = self.role_permissions(identity.role).await?;
        if required.iter().any(|code| granted.contains(*code)) {
            Ok(())
        } else {
            warn!(
                user_id = %identity.user_id,
                role = %identity.role,
                required = ?required,
                "Permission denied"
            );
            Err(AppError::forbidden("Access not permitted"))
        }
    }

    /// Passes if the caller's role is one of `allowed`.
    pub fn authorize_roles(&self, identity: &Identity, allowed: &[UserRole]) -> AppResult<()> {
        if allowed.contains(&identity.role) {
            Ok(())
        } else {
            warn!(
                user_id = %identity.user_id,
                role = %identity.role,
                "Role not allowed"
            );
            Err(AppError::forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                identity.role
            )))
        }
    }

    /// Whether `role` holds `code`.
    pub async fn has_permission(&self, role: UserRole, code: &str) -> AppResult<bool> {
        Ok(self.role_permissions(role).await?.contains(code))
    }

    /// Codes granted to `role`, possibly from cache.
    pub async fn role_permissions(&self, role: UserRole) -> AppResult<PermissionSet> {
        match &self.cache {
            Some(cache) => cache
                .try_get_with(role, self.load_permissions(role))
                .await
                .map_err(|e: Arc<AppError>| (*e).clone()),
            None => self.load_permissions(role).await,
        }
    }

    /// Drops the cached set of one role.
    pub async fn invalidate_role(&self, role: UserRole) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&role).await;
        }
    }

    /// Drops every cached set.
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    async fn load_permissions(&self, role: UserRole) -> AppResult<PermissionSet> {
        let codes = self
            .deadline
            .run(
                "list_permission_codes_for_role",
                self.store.list_permission_codes_for_role(role),
            )
            .await?;
        debug!(role = %role, count = codes.len(), "Loaded role permissions");
        Ok(Arc::new(codes.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use warden_core::config::AuthConfig;
    use warden_core::error::ErrorKind;

    use super::*;
    use crate::audit::ClientContext;
    use crate::test_support::{ACCESS_SECRET, Fixture, REFRESH_SECRET};

    async fn reader(fx: &Fixture) -> Identity {
        fx.store
            .set_role_permissions(UserRole::User, &["post.read", "post.list"])
            .await;
        let user = fx.user("reader@example.com", "password1", UserRole::User).await;
        Identity::from(&user)
    }

    #[tokio::test]
    async fn test_scope_uses_or_semantics() {
        let fx = Fixture::new();
        let gate = fx.gate();
        let identity = reader(&fx).await;

        let denied = gate
            .authorize_scope(&identity, &["post.create"])
            .await
            .unwrap_err();
        assert_eq!(denied.kind, ErrorKind::Forbidden);

        gate.authorize_scope(&identity, &["post.create", "post.read"])
            .await
            .unwrap();
        gate.authorize_scope(&identity, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_scope_passes_without_store() {
        let fx = Fixture::new();
        let gate = fx.gate();
        let identity = reader(&fx).await;
        fx.store.set_failing(true);
        gate.authorize_scope(&identity, &[]).await.unwrap();
        gate.authorize_any(&identity).unwrap();
    }

    #[tokio::test]
    async fn test_role_gate() {
        let fx = Fixture::new();
        let gate = fx.gate();
        let identity = reader(&fx).await;
        gate.authorize_roles(&identity, &[UserRole::User, UserRole::Admin])
            .unwrap();
        let err = gate
            .authorize_roles(&identity, &[UserRole::Admin])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_authenticate_rechecks_active_status() {
        let fx = Fixture::new();
        let gate = fx.gate();
        let user = fx.user("kim@example.com", "password1", UserRole::User).await;
        let token = fx.tokens.issue_access_token(&user).unwrap();

        let identity = gate.authenticate(&token).await.unwrap();
        assert_eq!(identity.user_id, user.id);

        fx.deactivate(&user).await;
        let err = gate.authenticate(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_authenticate_token_failures() {
        let fx = Fixture::new();
        let gate = fx.gate();
        let user = fx.user("lee@example.com", "password1", UserRole::User).await;
        let token = fx.tokens.issue_access_token(&user).unwrap();
        let refresh = fx.tokens.issue_refresh_token(&user).unwrap();

        assert_eq!(
            gate.authenticate("garbage").await.unwrap_err().kind,
            ErrorKind::InvalidToken
        );
        assert_eq!(
            gate.authenticate(&refresh).await.unwrap_err().kind,
            ErrorKind::InvalidToken
        );

        fx.clock.advance(ChronoDuration::minutes(15));
        assert_eq!(
            gate.authenticate(&token).await.unwrap_err().kind,
            ErrorKind::TokenExpired
        );
    }

    #[tokio::test]
    async fn test_cached_permissions_until_invalidated() {
        let fx = Fixture::new();
        let gate = fx.gate();
        let identity = reader(&fx).await;

        assert!(!gate.has_permission(UserRole::User, "post.create").await.unwrap());
        fx.store
            .set_role_permissions(UserRole::User, &["post.create"])
            .await;
        assert!(!gate.has_permission(UserRole::User, "post.create").await.unwrap());

        gate.invalidate_role(UserRole::User).await;
        gate.authorize_scope(&identity, &["post.create"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_uncached_gate_sees_changes_immediately() {
        let mut config = AuthConfig::with_secrets(ACCESS_SECRET, REFRESH_SECRET);
        config.permission_cache_ttl_seconds = 0;
        let fx = Fixture::with_config(config);
        let gate = fx.gate();

        fx.store.set_role_permissions(UserRole::User, &[]).await;
        assert!(!gate.has_permission(UserRole::User, "post.read").await.unwrap());
        fx.store
            .set_role_permissions(UserRole::User, &["post.read"])
            .await;
        assert!(gate.has_permission(UserRole::User, "post.read").await.unwrap());
    }

    #[tokio::test]
    async fn test_seeded_admin_end_to_end() {
        let fx = Fixture::new();
        let gate = fx.gate();
        fx.user("admin@example.com", "admin123", UserRole::Admin).await;

        let login = fx
            .tokens
            .login("admin@example.com", "admin123", &ClientContext::default())
            .await
            .unwrap();
        assert_eq!(login.user.role, UserRole::Admin);

        let identity = gate.authenticate(&login.tokens.access_token).await.unwrap();
        gate.authorize_scope(&identity, &["user.delete"]).await.unwrap();
    }
}
