//! User handlers: own profile and administrative user management.

use axum::extract::{Path, Query, State};
use axum_extra::extract::WithRejection;
use tracing::info;

use warden_auth::AuditEvent;
use warden_core::error::AppError;
use warden_entity::audit::AuditAction;
use warden_entity::user::{CreateUser, UpdateUser, User, UserProfile, UserRole};

use crate::dto::SuccessCode;
use crate::dto::request::{CreateUserRequest, UpdateUserRequest, UserListQuery};
use crate::dto::response::Reply;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthUser, ClientInfo, PaginationParams, ValidatedJson, parse_uuid};
use crate::middleware::{require_any, require_roles, require_scopes, require_self_or_admin};
use crate::state::AppState;

async fn load_user(state: &AppState, id: uuid::Uuid) -> ApiResult<User> {
    state
        .deadline
        .run("find_user_by_id", state.credentials.find_user_by_id(id))
        .await?
        .ok_or_else(|| AppError::not_found("User not found").into())
}

/// GET /api/{version}/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Reply<UserProfile>> {
    require_any(&auth)?;
    let user = load_user(&state, auth.user_id).await?;
    Ok(state.respond(
        SuccessCode::Success,
        "Profile retrieved successfully",
        user.profile(),
    ))
}

/// GET /api/{version}/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Query(page), _): WithRejection<Query<PaginationParams>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<UserListQuery>, ApiError>,
) -> ApiResult<Reply<Vec<UserProfile>>> {
    require_scopes(&auth, &["user.list"]).await?;
    let page = page.into_page_request();
    let users = state
        .deadline
        .run("list_users", state.credentials.list_users(&query.into(), &page))
        .await?;
    Ok(state.respond_page("Users retrieved successfully", users.map(|u| u.profile())))
}

/// GET /api/{version}/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reply<UserProfile>> {
    require_scopes(&auth, &["user.read"]).await?;
    let user = load_user(&state, parse_uuid(&id)?).await?;
    Ok(state.respond(
        SuccessCode::Success,
        "User retrieved successfully",
        user.profile(),
    ))
}

/// POST /api/{version}/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientInfo(client): ClientInfo,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Reply<UserProfile>> {
    require_scopes(&auth, &["user.create"]).await?;
    state.tokens.validator().validate(&req.password)?;
    let password_hash = state.tokens.hasher().hash_password(&req.password)?;

    let user = state
        .deadline
        .run(
            "create_user",
            state.credentials.create_user(&CreateUser {
                email: req.email.trim().to_lowercase(),
                username: req.username,
                password_hash: Some(password_hash),
                full_name: req.full_name,
                role: req.role.unwrap_or(UserRole::User),
            }),
        )
        .await?;

    state.audit.record(
        AuditEvent::new(AuditAction::Create, "User")
            .by(auth.user_id)
            .target(user.id)
            .detail(format!("User created: {}", user.email))
            .from_client(&client),
    );
    info!(actor_id = %auth.user_id, user_id = %user.id, role = %user.role, "User created");

    Ok(state.respond(
        SuccessCode::Created,
        "User created successfully",
        user.profile(),
    ))
}

/// PUT /api/{version}/users/{id}
///
/// Non-admins may only update themselves and never their role or status.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientInfo(client): ClientInfo,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Reply<UserProfile>> {
    require_scopes(&auth, &["user.update"]).await?;
    let id = parse_uuid(&id)?;

    require_self_or_admin(&auth, id)?;
    if req.role.is_some() || req.is_active.is_some() {
        require_roles(&auth, &[UserRole::Admin])?;
    }

    load_user(&state, id).await?;

    let password_hash = match req.password.as_deref() {
        Some(password) => {
            state.tokens.validator().validate(password)?;
            Some(state.tokens.hasher().hash_password(password)?)
        }
        None => None,
    };
    let changes = UpdateUser {
        email: req.email.map(|e| e.trim().to_lowercase()),
        username: req.username,
        password_hash,
        role: req.role,
        is_active: req.is_active,
    };
    if changes.is_empty() {
        return Err(AppError::bad_request("No fields to update").into());
    }

    let user = state
        .deadline
        .run("update_user", state.credentials.update_user(id, &changes))
        .await?;

    if changes.is_active == Some(false) || changes.password_hash.is_some() {
        let revoked = state
            .deadline
            .run(
                "revoke_all_for_user",
                state.credentials.revoke_all_for_user(id),
            )
            .await?;
        info!(user_id = %id, revoked, "Refresh tokens revoked after account change");
    }

    state.audit.record(
        AuditEvent::new(AuditAction::Update, "User")
            .by(auth.user_id)
            .target(user.id)
            .detail(format!("User updated: {}", user.email))
            .from_client(&client),
    );

    Ok(state.respond(
        SuccessCode::Updated,
        "User updated successfully",
        user.profile(),
    ))
}

/// DELETE /api/{version}/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ClientInfo(client): ClientInfo,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    require_scopes(&auth, &["user.delete"]).await?;
    let id = parse_uuid(&id)?;

    if auth.user_id == id {
        return Err(AppError::bad_request("You cannot delete your own account").into());
    }

    let user = load_user(&state, id).await?;
    let removed = state
        .deadline
        .run("delete_user", state.credentials.delete_user(id))
        .await?;
    if !removed {
        return Err(AppError::not_found("User not found").into());
    }

    state.audit.record(
        AuditEvent::new(AuditAction::Delete, "User")
            .by(auth.user_id)
            .target(id)
            .detail(format!("User deleted: {}", user.email))
            .from_client(&client),
    );
    info!(actor_id = %auth.user_id, user_id = %id, "User deleted");

    Ok(state.respond(SuccessCode::Deleted, "User deleted successfully", ()))
}
