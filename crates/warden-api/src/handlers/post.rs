//! Post handlers. Ownership rules are enforced here, after the scope check.

use axum::extract::{Path, Query, State};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use warden_auth::AuditEvent;
use warden_core::error::AppError;
use warden_entity::audit::AuditAction;
use warden_entity::post::{CreatePost, Post, UpdatePost};

use crate::dto::SuccessCode;
use crate::dto::request::{CreatePostRequest, PostListQuery, UpdatePostRequest};
use crate::dto::response::Reply;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthUser, ClientInfo, PaginationParams, ValidatedJson, parse_uuid};
use crate::middleware::require_scopes;
use crate::state::AppState;

async fn load_post(state: &AppState, id: Uuid) -> ApiResult<Post> {
    state
        .deadline
        .run("find_post", state.posts.find_post(id))
        .await?
        .ok_or_else(|| AppError::not_found("Post not found").into())
}

fn ensure_owner(auth: &AuthUser, post: &Post, message: &str) -> ApiResult<()> {
    if auth.is_admin() || post.is_owned_by(auth.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden(message).into())
    }
}

/// GET /api/{version}/posts
///
/// Non-admins see published posts plus their own drafts.
pub async fn list_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Query(page), _): WithRejection<Query<PaginationParams>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<PostListQuery>, ApiError>,
) -> ApiResult<Reply<Vec<Post>>> {
    require_scopes(&auth, &["post.list"]).await?;
    let viewer = (!auth.is_admin()).then_some(auth.user_id);
    let filter = query.into_filter(viewer);
    let page = page.into_page_request();

    let posts = state
        .deadline
        .run("list_posts", state.posts.list_posts(&filter, &page))
        .await?;
    Ok(state.respond_page("Posts retrieved successfully", posts))
}

/// GET /api/{version}/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<Post>> {
    require_scopes(&auth, &["post.read"]).await?;
    let post = load_post(&state, parse_uuid(&id)?).await?;
    if !post.published {
        ensure_owner(&auth, &post, "Access denied")?;
    }
    Ok(state.respond(SuccessCode::Success, "Post retrieved successfully", post))
}

/// POST /api/{version}/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientInfo(client): ClientInfo,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> ApiResult<Reply<Post>> {
    require_scopes(&auth, &["post.create"]).await?;
    let post = state
        .deadline
        .run(
            "create_post",
            state.posts.create_post(&CreatePost {
                title: req.title,
                content: req.content,
                published: req.published,
                author_id: auth.user_id,
            }),
        )
        .await?;

    state.audit.record(
        AuditEvent::new(AuditAction::Create, "Post")
            .by(auth.user_id)
            .target(post.id)
            .detail(format!("Post created: {}", post.title))
            .from_client(&client),
    );

    Ok(state.respond(SuccessCode::Created, "Post created successfully", post))
}

/// PUT /api/{version}/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientInfo(client): ClientInfo,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdatePostRequest>,
) -> ApiResult<Reply<Post>> {
    require_scopes(&auth, &["post.update"]).await?;
    let existing = load_post(&state, parse_uuid(&id)?).await?;
    ensure_owner(&auth, &existing, "You can only update your own posts")?;

    let post = state
        .deadline
        .run(
            "update_post",
            state.posts.update_post(
                existing.id,
                &UpdatePost {
                    title: req.title,
                    content: req.content,
                    published: req.published,
                },
            ),
        )
        .await?;

    state.audit.record(
        AuditEvent::new(AuditAction::Update, "Post")
            .by(auth.user_id)
            .target(post.id)
            .detail(format!("Post updated: {}", post.title))
            .from_client(&client),
    );

    Ok(state.respond(SuccessCode::Updated, "Post updated successfully", post))
}

/// DELETE /api/{version}/posts/{id}
///
/// Marks the post deleted; the row stays for audit.
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientInfo(client): ClientInfo,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    require_scopes(&auth, &["post.delete"]).await?;
    let post = load_post(&state, parse_uuid(&id)?).await?;
    ensure_owner(&auth, &post, "You can only delete your own posts")?;

    let removed = state
        .deadline
        .run("delete_post", state.posts.delete_post(post.id))
        .await?;
    if !removed {
        return Err(AppError::not_found("Post not found").into());
    }

    state.audit.record(
        AuditEvent::new(AuditAction::Delete, "Post")
            .by(auth.user_id)
            .target(post.id)
            .detail(format!("Post deleted: {}", post.title))
            .from_client(&client),
    );

    Ok(state.respond(SuccessCode::Deleted, "Post deleted successfully", ()))
}
