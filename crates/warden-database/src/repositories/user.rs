//! User repository implementation.

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_entity::user::{CreateUser, UpdateUser, User, UserFilter};

use super::{db_error, unique_violation};

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    /// List users matching `filter`, newest first.
    pub async fn find_all(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let users = select
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list users"))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, username, password_hash, full_name, role) \
             VALUES (LOWER($1), $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.full_name)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(constraint) => duplicate_error(constraint, &data.email, &data.username),
            None => db_error("Failed to create user")(e),
        })
    }

    /// Apply a partial update. Fails with `NotFound` if the user does not exist.
    pub async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<User> {
        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET \
                email = COALESCE(LOWER($2), email), \
                username = COALESCE($3, username), \
                password_hash = COALESCE($4, password_hash), \
                role = COALESCE($5, role), \
                is_active = COALESCE($6, is_active), \
                updated_at = $7 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(data.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(constraint) => duplicate_error(
                constraint,
                data.email.as_deref().unwrap_or_default(),
                data.username.as_deref().unwrap_or_default(),
            ),
            None => db_error("Failed to update user")(e),
        })?;

        updated.ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Check database connectivity.
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(db_error("Health check failed"))
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    builder.push(" WHERE TRUE");
    if let Some(role) = filter.role {
        builder.push(" AND role = ").push_bind(role);
    }
    if let Some(active) = filter.is_active {
        builder.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        builder
            .push(" AND (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR username ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn duplicate_error(constraint: &str, email: &str, username: &str) -> AppError {
    match constraint {
        "users_email_key" => AppError::duplicate(format!("Email '{email}' is already registered")),
        "users_username_key" => AppError::duplicate(format!("Username '{username}' is already taken")),
        _ => AppError::duplicate("Email or username already exists"),
    }
}
