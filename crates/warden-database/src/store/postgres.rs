//! Postgres-backed stores, delegating to the concrete repositories.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_entity::audit::{AuditFilter, AuditLogEntry, NewAuditLogEntry};
use warden_entity::permission::Permission;
use warden_entity::post::{CreatePost, Post, PostFilter, UpdatePost};
use warden_entity::token::{NewRefreshToken, RefreshTokenRecord};
use warden_entity::user::{CreateUser, UpdateUser, User, UserFilter, UserRole};

use super::{AuditStore, CredentialStore, PostStore};
use crate::repositories::{
    AuditLogRepository, PermissionRepository, PostRepository, RefreshTokenRepository,
    UserRepository,
};

/// All stores over one Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    users: UserRepository,
    tokens: RefreshTokenRepository,
    permissions: PermissionRepository,
    audit: AuditLogRepository,
    posts: PostRepository,
}

impl PgStore {
    /// Build the store over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: RefreshTokenRepository::new(pool.clone()),
            permissions: PermissionRepository::new(pool.clone()),
            audit: AuditLogRepository::new(pool.clone()),
            posts: PostRepository::new(pool),
        }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        self.users.create(data).await
    }

    async fn update_user(&self, id: Uuid, data: &UpdateUser) -> AppResult<User> {
        self.users.update(id, data).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        self.users.delete(id).await
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        self.users.find_all(filter, page).await
    }

    async fn find_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        self.tokens.find_by_hash(token_hash).await
    }

    async fn create_refresh_token(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        self.tokens.create(data).await
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<u64> {
        self.tokens.revoke_by_hash(token_hash).await
    }

    async fn rotate_refresh_token(
        &self,
        old_id: Uuid,
        new: &NewRefreshToken,
    ) -> AppResult<RefreshTokenRecord> {
        self.tokens.rotate(old_id, new).await
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.tokens.revoke_all_for_user(user_id).await
    }

    async fn list_permission_codes_for_role(&self, role: UserRole) -> AppResult<Vec<String>> {
        self.permissions.codes_for_role(role).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.permissions.find_all().await
    }

    async fn ping(&self) -> AppResult<()> {
        self.users.ping().await
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, data: &CreatePost) -> AppResult<Post> {
        self.posts.create(data).await
    }

    async fn find_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        self.posts.find_by_id(id).await
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        self.posts.find_all(filter, page).await
    }

    async fn update_post(&self, id: Uuid, data: &UpdatePost) -> AppResult<Post> {
        self.posts.update(id, data).await
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        self.posts.soft_delete(id).await
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn append(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        self.audit.create(entry).await
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.audit.search(filter, page).await
    }
}
