//! Post repository implementation.

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_entity::post::{CreatePost, Post, PostFilter, UpdatePost};

use super::db_error;

/// Repository for posts.
#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a post that has not been deleted.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1 AND is_deleted = FALSE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find post"))
    }

    /// List posts matching `filter`.
    pub async fn find_all(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count posts"))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM posts");
        push_filter(&mut select, filter);
        // Column and direction come from closed enums, never from input text.
        select
            .push(format!(
                " ORDER BY {} {} LIMIT ",
                filter.sort_by.column(),
                filter.sort_order.keyword()
            ))
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let posts = select
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list posts"))?;

        Ok(PageResponse::new(posts, page, total as u64))
    }

    /// Create a post.
    pub async fn create(&self, data: &CreatePost) -> AppResult<Post> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (title, content, published, author_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.published)
        .bind(data.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create post"))
    }

    /// Apply a partial update to a live post.
    pub async fn update(&self, id: Uuid, data: &UpdatePost) -> AppResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            "UPDATE posts SET \
                title = COALESCE($2, title), \
                content = COALESCE($3, content), \
                published = COALESCE($4, published), \
                updated_at = $5 \
             WHERE id = $1 AND is_deleted = FALSE \
             RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.published)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update post"))?;

        post.ok_or_else(|| AppError::not_found(format!("Post {id} not found")))
    }

    /// Flag a post as deleted. Returns `true` if a live post was flagged.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE posts SET is_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to delete post"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE is_deleted = FALSE");
    if let Some(published) = filter.published {
        builder.push(" AND published = ").push_bind(published);
    }
    if let Some(viewer) = filter.visible_to {
        builder
            .push(" AND (published = TRUE OR author_id = ")
            .push_bind(viewer)
            .push(")");
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
