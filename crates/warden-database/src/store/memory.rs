//! In-memory store used by tests, demos and the `--memory` server mode.
//!
//! All state sits behind one `tokio::sync::RwLock`. Conditional writes
//! (user uniqueness, refresh rotation) check and mutate under a single
//! write guard, which gives the same first-committer-wins outcome as the
//! Postgres conditional update.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_entity::audit::{AuditFilter, AuditLogEntry, NewAuditLogEntry};
use warden_entity::permission::Permission;
use warden_entity::post::{CreatePost, Post, PostFilter, PostSort, SortOrder, UpdatePost};
use warden_entity::token::{NewRefreshToken, RefreshTokenRecord};
use warden_entity::user::{CreateUser, UpdateUser, User, UserFilter, UserRole};

use super::{AuditStore, CredentialStore, PostStore};
use crate::seed::{PERMISSIONS, default_codes};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    tokens: Vec<RefreshTokenRecord>,
    permissions: Vec<Permission>,
    grants: Vec<(UserRole, Uuid)>,
    posts: Vec<Post>,
    audit: Vec<AuditLogEntry>,
}

impl State {
    fn seeded() -> Self {
        let now = Utc::now();
        let permissions: Vec<Permission> = PERMISSIONS
            .iter()
            .map(|seed| Permission {
                id: Uuid::new_v4(),
                code: seed.code.to_string(),
                name: seed.name.to_string(),
                description: Some(seed.description.to_string()),
                resource: seed.resource().to_string(),
                action: seed.action().to_string(),
                created_at: now,
            })
            .collect();

        let mut grants = Vec::new();
        for role in UserRole::ALL {
            for code in default_codes(role) {
                if let Some(p) = permissions.iter().find(|p| p.code == code) {
                    grants.push((role, p.id));
                }
            }
        }

        Self {
            permissions,
            grants,
            ..Self::default()
        }
    }

    fn check_user_unique(&self, email: &str, username: &str, except: Option<Uuid>) -> AppResult<()> {
        let others = || self.users.iter().filter(|u| Some(u.id) != except);
        if others().any(|u| u.email == email) {
            return Err(AppError::duplicate("A user with this email already exists"));
        }
        if others().any(|u| u.username == username) {
            return Err(AppError::duplicate("A user with this username already exists"));
        }
        Ok(())
    }
}

/// Process-local implementation of every store trait.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    latency_ms: Arc<AtomicU64>,
    failing: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store holding the default permission matrix.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::seeded())),
            latency_ms: Arc::new(AtomicU64::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Delay every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with `StoreError`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of refresh records, revoked or not, held for `user_id`.
    pub async fn refresh_token_count(&self, user_id: Uuid) -> usize {
        let state = self.state.read().await;
        state.tokens.iter().filter(|t| t.user_id == user_id).count()
    }

    /// Number of users.
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Replace the codes granted to `role`. Unknown codes are ignored.
    pub async fn set_role_permissions(&self, role: UserRole, codes: &[&str]) {
        let mut state = self.state.write().await;
        let ids: Vec<Uuid> = state
            .permissions
            .iter()
            .filter(|p| codes.contains(&p.code.as_str()))
            .map(|p| p.id)
            .collect();
        state.grants.retain(|(r, _)| *r != role);
        state.grants.extend(ids.into_iter().map(|id| (role, id)));
    }

    async fn enter(&self) -> AppResult<()> {
        let millis = self.latency_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::store("Store is unavailable"));
        }
        Ok(())
    }
}

fn paginate<T: Clone>(items: Vec<&T>, page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    let slice = items
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    PageResponse::new(slice, page, total)
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.enter().await?;
        let email = email.to_lowercase();
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        self.enter().await?;
        let email = data.email.to_lowercase();
        let mut state = self.state.write().await;
        state.check_user_unique(&email, &data.username, None)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            full_name: data.full_name.clone(),
            role: data.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        debug!(user_id = %user.id, "User created in memory store");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, data: &UpdateUser) -> AppResult<User> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let current = state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        let email = data
            .email
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or(current.email);
        let username = data.username.clone().unwrap_or(current.username);
        state.check_user_unique(&email, &username, Some(id))?;

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.email = email;
        user.username = username;
        if let Some(hash) = &data.password_hash {
            user.password_hash = Some(hash.clone());
        }
        if let Some(role) = data.role {
            user.role = role;
        }
        if let Some(active) = data.is_active {
            user.is_active = active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        let removed = state.users.len() != before;
        if removed {
            state.tokens.retain(|t| t.user_id != id);
            state.posts.retain(|p| p.author_id != id);
            for entry in state.audit.iter_mut().filter(|e| e.user_id == Some(id)) {
                entry.user_id = None;
            }
        }
        Ok(removed)
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        self.enter().await?;
        let state = self.state.read().await;
        let matching: Vec<&User> = state.users.iter().rev().filter(|u| filter.matches(u)).collect();
        Ok(paginate(matching, page))
    }

    async fn find_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(state
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn create_refresh_token(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        self.enter().await?;
        let mut state = self.state.write().await;
        if state.tokens.iter().any(|t| t.token_hash == data.token_hash) {
            return Err(AppError::duplicate("Refresh token already exists"));
        }
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            token_hash: data.token_hash.clone(),
            user_id: data.user_id,
            expires_at: data.expires_at,
            revoked: false,
            created_at: Utc::now(),
        };
        state.tokens.push(record.clone());
        Ok(record)
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<u64> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let mut changed = 0;
        for t in state
            .tokens
            .iter_mut()
            .filter(|t| t.token_hash == token_hash && !t.revoked)
        {
            t.revoked = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn rotate_refresh_token(
        &self,
        old_id: Uuid,
        new: &NewRefreshToken,
    ) -> AppResult<RefreshTokenRecord> {
        self.enter().await?;
        let mut state = self.state.write().await;

        if state.tokens.iter().any(|t| t.token_hash == new.token_hash) {
            return Err(AppError::duplicate("Refresh token already exists"));
        }
        let old = state
            .tokens
            .iter_mut()
            .find(|t| t.id == old_id && !t.revoked)
            .ok_or_else(|| AppError::invalid_token("Refresh token has already been used"))?;
        old.revoked = true;

        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            token_hash: new.token_hash.clone(),
            user_id: new.user_id,
            expires_at: new.expires_at,
            revoked: false,
            created_at: Utc::now(),
        };
        state.tokens.push(record.clone());
        Ok(record)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let mut changed = 0;
        for t in state
            .tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && !t.revoked)
        {
            t.revoked = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn list_permission_codes_for_role(&self, role: UserRole) -> AppResult<Vec<String>> {
        self.enter().await?;
        let state = self.state.read().await;
        let mut codes: Vec<String> = state
            .grants
            .iter()
            .filter(|(r, _)| *r == role)
            .filter_map(|(_, id)| state.permissions.iter().find(|p| p.id == *id))
            .map(|p| p.code.clone())
            .collect();
        codes.sort();
        Ok(codes)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.enter().await?;
        let state = self.state.read().await;
        let mut all = state.permissions.clone();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(all)
    }

    async fn ping(&self) -> AppResult<()> {
        self.enter().await
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, data: &CreatePost) -> AppResult<Post> {
        self.enter().await?;
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == data.author_id) {
            return Err(AppError::not_found(format!("User {} not found", data.author_id)));
        }
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: data.title.clone(),
            content: data.content.clone(),
            published: data.published,
            author_id: data.author_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        self.enter().await?;
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id && !p.is_deleted)
            .cloned())
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        self.enter().await?;
        let state = self.state.read().await;
        let mut matching: Vec<&Post> = state.posts.iter().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| {
            let ord = match filter.sort_by {
                PostSort::CreatedAt => a.created_at.cmp(&b.created_at),
                PostSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                PostSort::Title => a.title.cmp(&b.title),
            };
            match filter.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        Ok(paginate(matching, page))
    }

    async fn update_post(&self, id: Uuid, data: &UpdatePost) -> AppResult<Post> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id && !p.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Post {id} not found")))?;
        if let Some(title) = &data.title {
            post.title = title.clone();
        }
        if let Some(content) = &data.content {
            post.content = content.clone();
        }
        if let Some(published) = data.published {
            post.published = published;
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        self.enter().await?;
        let mut state = self.state.write().await;
        match state
            .posts
            .iter_mut()
            .find(|p| p.id == id && !p.is_deleted)
        {
            Some(post) => {
                post.is_deleted = true;
                post.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        self.enter().await?;
        let mut state = self.state.write().await;
        let stored = AuditLogEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            entity: entry.entity.clone(),
            entity_id: entry.entity_id.clone(),
            details: entry.details.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            created_at: Utc::now(),
        };
        state.audit.push(stored.clone());
        Ok(stored)
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.enter().await?;
        let state = self.state.read().await;
        let matching: Vec<&AuditLogEntry> =
            state.audit.iter().rev().filter(|e| filter.matches(e)).collect();
        Ok(paginate(matching, page))
    }
}
