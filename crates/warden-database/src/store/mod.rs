//! Store capabilities consumed by the auth core and the HTTP layer.
//!
//! Components receive these as `Arc<dyn ...>` at construction time; there is
//! no process-global store handle.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_entity::audit::{AuditFilter, AuditLogEntry, NewAuditLogEntry};
use warden_entity::permission::Permission;
use warden_entity::post::{CreatePost, Post, PostFilter, UpdatePost};
use warden_entity::token::{NewRefreshToken, RefreshTokenRecord};
use warden_entity::user::{CreateUser, UpdateUser, User, UserFilter, UserRole};

/// Users, refresh tokens and role grants.
///
/// Every method may fail with `StoreError` (connectivity, unexpected
/// constraint failures) or `ServiceUnavailable` (pool exhaustion).
/// Uniqueness violations on users surface as `DuplicateEntry`.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Find a user by email, case-insensitively.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by id.
    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by exact username.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a user. The email is stored lower-cased.
    async fn create_user(&self, data: &CreateUser) -> AppResult<User>;

    /// Partially update a user. `NotFound` if absent.
    async fn update_user(&self, id: Uuid, data: &UpdateUser) -> AppResult<User>;

    /// Remove a user. Returns `true` if a row was removed.
    async fn delete_user(&self, id: Uuid) -> AppResult<bool>;

    /// List users, newest first.
    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>>;

    /// Find a refresh record by token digest.
    async fn find_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>>;

    /// Persist a new refresh record.
    async fn create_refresh_token(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord>;

    /// Revoke every record with this digest. Zero matches is not an error.
    async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<u64>;

    /// Atomically revoke `old_id` and insert `new`.
    ///
    /// Fails with `InvalidToken` and changes nothing if `old_id` is already
    /// revoked, so that exactly one of several concurrent rotations wins.
    async fn rotate_refresh_token(
        &self,
        old_id: Uuid,
        new: &NewRefreshToken,
    ) -> AppResult<RefreshTokenRecord>;

    /// Revoke every outstanding record of a user.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Permission codes granted to `role`.
    async fn list_permission_codes_for_role(&self, role: UserRole) -> AppResult<Vec<String>>;

    /// All permissions.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Cheap reachability probe.
    async fn ping(&self) -> AppResult<()>;
}

/// Post persistence.
#[async_trait]
pub trait PostStore: Send + Sync + 'static {
    /// Create a post.
    async fn create_post(&self, data: &CreatePost) -> AppResult<Post>;

    /// Find a live post.
    async fn find_post(&self, id: Uuid) -> AppResult<Option<Post>>;

    /// List live posts.
    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Post>>;

    /// Partially update a live post. `NotFound` if absent.
    async fn update_post(&self, id: Uuid, data: &UpdatePost) -> AppResult<Post>;

    /// Flag a post as deleted.
    async fn delete_post(&self, id: Uuid) -> AppResult<bool>;
}

/// Audit log persistence.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Append an entry.
    async fn append(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Search entries, newest first.
    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}
