//! Integration tests for role and scope checks on the HTTP surface.

use axum::http::StatusCode;
use serde_json::json;

use warden_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_user_cannot_manage_users() {
    let app = TestApp::new();
    let (_, session) = app.member("plain@example.com").await;
    let (other, _) = app.member("other@example.com").await;

    let list = app
        .request("GET", &app.path("/users"), None, Some(&session.access))
        .await;
    assert_eq!(list.status, StatusCode::FORBIDDEN);
    assert_eq!(list.error(), "FORBIDDEN");

    let delete = app
        .request(
            "DELETE",
            &app.path(&format!("/users/{}", other.id)),
            None,
            Some(&session.access),
        )
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let create = app
        .request(
            "POST",
            &app.path("/users"),
            Some(json!({ "email": "x@example.com", "username": "xxx", "password": "password123" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_profile_needs_only_authentication() {
    let app = TestApp::new();
    let (user, session) = app.member("prof@example.com").await;

    let response = app
        .request("GET", &app.path("/users/profile"), None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], user.id.to_string());
}

#[tokio::test]
async fn test_scope_grants_are_read_live() {
    let app = TestApp::new();
    let (_, session) = app.member("grant@example.com").await;

    let before = app
        .request("GET", &app.path("/posts"), None, Some(&session.access))
        .await;
    assert_eq!(before.status, StatusCode::OK);

    app.store
        .set_role_permissions(UserRole::User, &["user.profile"])
        .await;
    app.state.gate.invalidate_role(UserRole::User).await;

    let after = app
        .request("GET", &app.path("/posts"), None, Some(&session.access))
        .await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_passes_every_scope() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;

    for path in ["/users", "/posts", "/audit-logs", "/audit-logs/me"] {
        let response = app
            .request("GET", &app.path(path), None, Some(&admin.access))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_update_grant_only_covers_own_account() {
    let app = TestApp::new();
    let (me, session) = app.member("self@example.com").await;
    let (other, _) = app.member("neighbour@example.com").await;

    let denied = app
        .request(
            "PUT",
            &app.path(&format!("/users/{}", me.id)),
            Some(json!({ "username": "renamed" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    app.store
        .set_role_permissions(UserRole::User, &["user.profile", "user.update"])
        .await;
    app.state.gate.invalidate_role(UserRole::User).await;

    let own = app
        .request(
            "PUT",
            &app.path(&format!("/users/{}", me.id)),
            Some(json!({ "username": "renamed" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.data()["username"], "renamed");

    let foreign = app
        .request(
            "PUT",
            &app.path(&format!("/users/{}", other.id)),
            Some(json!({ "username": "hijacked" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let promote = app
        .request(
            "PUT",
            &app.path(&format!("/users/{}", me.id)),
            Some(json!({ "role": "ADMIN" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(promote.status, StatusCode::FORBIDDEN);
}
