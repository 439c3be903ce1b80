//! Integration tests for user management.

use axum::http::StatusCode;
use serde_json::json;

use warden_database::CredentialStore;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_admin_creates_and_lists_users() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;

    let created = app
        .request(
            "POST",
            &app.path("/users"),
            Some(json!({
                "email": "staff@example.com",
                "username": "staff",
                "password": "password123",
                "role": "ADMIN",
            })),
            Some(&admin.access),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["role"], "ADMIN");

    let listed = app
        .request("GET", &app.path("/users?page=1&limit=1"), None, Some(&admin.access))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.data().as_array().unwrap().len(), 1);
    assert_eq!(listed.body["meta"]["total"], 2);
    assert_eq!(listed.body["meta"]["total_pages"], 2);

    let filtered = app
        .request("GET", &app.path("/users?search=staff"), None, Some(&admin.access))
        .await;
    assert_eq!(filtered.body["meta"]["total"], 1);
}

#[tokio::test]
async fn test_admin_deletes_another_user() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (target, _) = app.member("victim@example.com").await;

    let response = app
        .request(
            "DELETE",
            &app.path(&format!("/users/{}", target.id)),
            None,
            Some(&admin.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["code"], "040001");
    assert!(app.store.find_user_by_id(target.id).await.unwrap().is_none());

    let again = app
        .request(
            "DELETE",
            &app.path(&format!("/users/{}", target.id)),
            None,
            Some(&admin.access),
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new();
    let (me, admin) = app.admin().await;

    let response = app
        .request(
            "DELETE",
            &app.path(&format!("/users/{}", me.id)),
            None,
            Some(&admin.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivation_revokes_sessions() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (target, session) = app.member("paused@example.com").await;

    let response = app
        .request(
            "PUT",
            &app.path(&format!("/users/{}", target.id)),
            Some(json!({ "isActive": false })),
            Some(&admin.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["code"], "030001");
    assert_eq!(response.data()["isActive"], false);

    let refresh = app
        .request(
            "POST",
            &app.path("/auth/refresh"),
            Some(json!({ "refreshToken": session.refresh })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    let me = app
        .request("GET", &app.path("/auth/me"), None, Some(&session.access))
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_ids_and_empty_updates() {
    let app = TestApp::new();
    let (me, admin) = app.admin().await;

    let bad_id = app
        .request("GET", &app.path("/users/not-a-uuid"), None, Some(&admin.access))
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);

    let empty = app
        .request(
            "PUT",
            &app.path(&format!("/users/{}", me.id)),
            Some(json!({})),
            Some(&admin.access),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .request(
            "GET",
            &app.path(&format!("/users/{}", uuid::Uuid::new_v4())),
            None,
            Some(&admin.access),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}
