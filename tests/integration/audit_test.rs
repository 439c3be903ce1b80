//! Integration tests for audit recording and reads.

use axum::http::StatusCode;
use serde_json::json;

use warden_entity::audit::AuditAction;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_login_is_recorded_with_client_context() {
    let app = TestApp::new();
    let (user, _) = app.member("seen@example.com").await;

    let entries = app.wait_for_audit(user.id, 1).await;
    let login = entries
        .iter()
        .find(|e| e.action == AuditAction::Login)
        .expect("login entry");
    assert_eq!(login.entity, "User");
    assert_eq!(login.ip_address.as_deref(), Some("198.51.100.4"));
    assert_eq!(login.user_agent.as_deref(), Some("warden-tests"));
}

#[tokio::test]
async fn test_post_changes_are_recorded() {
    let app = TestApp::new();
    let (user, session) = app.member("poster@example.com").await;

    let created = app
        .request(
            "POST",
            &app.path("/posts"),
            Some(json!({ "title": "Logged", "content": "body" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let post_id = created.data()["id"].as_str().unwrap().to_string();

    let entries = app.wait_for_audit(user.id, 2).await;
    let create = entries
        .iter()
        .find(|e| e.action == AuditAction::Create)
        .expect("create entry");
    assert_eq!(create.entity, "Post");
    assert_eq!(create.entity_id.as_deref(), Some(post_id.as_str()));
}

#[tokio::test]
async fn test_audit_reads_respect_scope() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (user, session) = app.member("quiet@example.com").await;
    app.wait_for_audit(user.id, 1).await;

    let denied = app
        .request("GET", &app.path("/audit-logs"), None, Some(&session.access))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let mine = app
        .request("GET", &app.path("/audit-logs/me"), None, Some(&session.access))
        .await;
    assert_eq!(mine.status, StatusCode::OK);
    let entries = mine.data().as_array().unwrap();
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e["userId"] == user.id.to_string()));

    let logins = app
        .request(
            "GET",
            &app.path("/audit-logs?action=LOGIN"),
            None,
            Some(&admin.access),
        )
        .await;
    assert_eq!(logins.status, StatusCode::OK);
    let entries = logins.data().as_array().unwrap();
    assert!(entries.len() >= 1);
    assert!(entries.iter().all(|e| e["action"] == "LOGIN"));
}
