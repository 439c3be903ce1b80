//! Route definitions for the Warden HTTP API.
//!
//! Resource routes are mounted under `/api/{api_version}`; the health
//! check lives at `/api/health`.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, get, post};

use crate::handlers;
use crate::middleware::RateLimiter;
use crate::middleware::rate_limit::enforce;
use crate::state::AppState;

/// Build the API router. Middleware is layered by [`crate::app::build_app`].
pub fn build_router(state: &AppState) -> Router<AppState> {
    let api_routes = Router::new()
        .merge(auth_routes(state))
        .merge(
            user_routes()
                .merge(post_routes())
                .merge(audit_routes())
                .route_layer(from_fn_with_state(state.limits.crud.clone(), enforce)),
        );

    Router::new()
        .nest(&format!("/api/{}", state.config.server.api_version), api_routes)
        .route("/api/health", get(handlers::health::health))
        .fallback(handlers::health::not_found)
}

/// Attaches a quota to a single route.
fn limited(route: MethodRouter<AppState>, limiter: &RateLimiter) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(limiter.clone(), enforce))
}

/// Auth endpoints: register, login, refresh, logout, me and SSO
fn auth_routes(state: &AppState) -> Router<AppState> {
    let limits = &state.limits;
    Router::new()
        .route(
            "/auth/register",
            limited(post(handlers::auth::register), &limits.register),
        )
        .route("/auth/login", limited(post(handlers::auth::login), &limits.login))
        .route(
            "/auth/refresh",
            limited(post(handlers::auth::refresh), &limits.refresh),
        )
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/auth/sso/login",
            limited(post(handlers::auth::sso_login), &limits.login),
        )
        .route("/auth/sso/verify", post(handlers::auth::sso_verify))
        .route("/auth/sso/info", get(handlers::auth::sso_info))
}

/// User profile and administration
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(handlers::user::get_profile))
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
}

/// Post CRUD
fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::post::get_post)
                .put(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
}

/// Audit log reads
fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(handlers::audit::list_audit_logs))
        .route("/audit-logs/me", get(handlers::audit::my_audit_logs))
}
