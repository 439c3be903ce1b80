//! Integration tests for the password authentication flow.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use warden_core::config::Environment;
use warden_entity::user::UserRole;

use crate::helpers::{TestApp, test_config};

#[tokio::test]
async fn test_seeded_admin_login() {
    let app = TestApp::new();
    app.create_user("admin@example.com", "admin123", UserRole::Admin)
        .await;

    let response = app
        .request(
            "POST",
            &app.path("/auth/login"),
            Some(json!({ "email": "admin@example.com", "password": "admin123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["code"], "010001");
    let data = response.data();
    assert_eq!(data["user"]["role"], "ADMIN");
    assert!(data["user"].get("passwordHash").is_none());
    assert_ne!(data["accessToken"], data["refreshToken"]);
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = TestApp::new();
    app.create_user("kim@example.com", "password123", UserRole::User)
        .await;

    let wrong_password = app
        .request(
            "POST",
            &app.path("/auth/login"),
            Some(json!({ "email": "kim@example.com", "password": "nope-nope" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            &app.path("/auth/login"),
            Some(json!({ "email": "ghost@example.com", "password": "password123" })),
            None,
        )
        .await;

    for response in [&wrong_password, &unknown] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error(), "INVALID_CREDENTIALS");
        assert_eq!(response.body["code"], "180001");
    }
    assert_eq!(wrong_password.body["message"], unknown.body["message"]);
}

#[tokio::test]
async fn test_inactive_user_cannot_login() {
    let app = TestApp::new();
    let user = app
        .create_user("off@example.com", "password123", UserRole::User)
        .await;
    app.set_active(&user, false).await;

    let response = app
        .request(
            "POST",
            &app.path("/auth/login"),
            Some(json!({ "email": "off@example.com", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = TestApp::new();
    let body = json!({
        "email": "New@Example.com",
        "username": "newbie",
        "password": "password123",
        "fullName": "New Bie",
    });

    let created = app
        .request("POST", &app.path("/auth/register"), Some(body.clone()), None)
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["code"], "020001");
    assert_eq!(created.data()["email"], "new@example.com");
    assert_eq!(created.data()["role"], "USER");
    assert!(created.data().get("accessToken").is_none());

    let duplicate = app
        .request("POST", &app.path("/auth/register"), Some(body), None)
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error(), "DUPLICATE_ENTRY");

    app.login("new@example.com", "password123").await;
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let bad_username = app
        .request(
            "POST",
            &app.path("/auth/register"),
            Some(json!({ "email": "a@example.com", "username": "a-b", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(bad_username.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(bad_username.error(), "VALIDATION_ERROR");
    assert!(bad_username.body["details"].get("username").is_some());

    let short_password = app
        .request(
            "POST",
            &app.path("/auth/register"),
            Some(json!({ "email": "a@example.com", "username": "abc", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(short_password.status, StatusCode::UNPROCESSABLE_ENTITY);

    let not_json = app
        .send(
            Request::builder()
                .method("POST")
                .uri(app.path("/auth/register"))
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(not_json.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_json.error(), "BAD_REQUEST");
}

#[tokio::test]
async fn test_refresh_rotation_is_single_use() {
    let app = TestApp::new();
    let (_, session) = app.member("rot@example.com").await;

    let first = app
        .request(
            "POST",
            &app.path("/auth/refresh"),
            Some(json!({ "refreshToken": session.refresh })),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let rotated = first.data()["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, session.refresh);

    let replay = app
        .request(
            "POST",
            &app.path("/auth/refresh"),
            Some(json!({ "refreshToken": session.refresh })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.error(), "INVALID_TOKEN");

    let next = app
        .request(
            "POST",
            &app.path("/auth/refresh"),
            Some(json!({ "refreshToken": rotated })),
            None,
        )
        .await;
    assert_eq!(next.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_for_inactive_user_is_forbidden() {
    let app = TestApp::new();
    let (user, session) = app.member("paused@example.com").await;
    app.set_active(&user, false).await;

    let response = app
        .request(
            "POST",
            &app.path("/auth/refresh"),
            Some(json!({ "refreshToken": session.refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = TestApp::new();
    let (_, session) = app.member("mix@example.com").await;

    let response = app
        .request(
            "POST",
            &app.path("/auth/refresh"),
            Some(json!({ "refreshToken": session.access })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::new();
    let (_, session) = app.member("bye@example.com").await;
    let body = json!({ "refreshToken": session.refresh });

    for _ in 0..2 {
        let response = app
            .request("POST", &app.path("/auth/logout"), Some(body.clone()), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["success"], true);
    }

    let empty = app
        .request("POST", &app.path("/auth/logout"), None, None)
        .await;
    assert_eq!(empty.status, StatusCode::OK);

    let refresh = app
        .request("POST", &app.path("/auth/refresh"), Some(body), None)
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_header_is_checked_before_the_token() {
    let app = TestApp::new();
    let me = app.path("/auth/me");

    let missing = app.request("GET", &me, None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error(), "UNAUTHORIZED");

    let basic = app
        .send(
            Request::builder()
                .uri(&me)
                .header("Authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(basic.status, StatusCode::UNAUTHORIZED);
    assert_eq!(basic.error(), "UNAUTHORIZED");

    let garbage = app.request("GET", &me, None, Some("not.a.jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.error(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_me_reflects_current_state() {
    let app = TestApp::new();
    let (user, session) = app.member("me@example.com").await;

    let response = app
        .request("GET", &app.path("/auth/me"), None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["userId"], user.id.to_string());
    assert_eq!(response.data()["role"], "USER");
    let permissions = response.data()["permissions"].as_array().unwrap();
    assert!(permissions.iter().any(|p| p == "post.create"));
    assert!(!permissions.iter().any(|p| p == "user.delete"));

    app.set_active(&user, false).await;
    let after = app
        .request("GET", &app.path("/auth/me"), None, Some(&session.access))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_failures_hide_internals_outside_development() {
    let app = TestApp::new();
    app.store.set_failing(true);

    let response = app
        .request(
            "POST",
            &app.path("/auth/login"),
            Some(json!({ "email": "x@example.com", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), "DATABASE_ERROR");
    assert_eq!(response.body["code"], "520001");
    assert_eq!(response.body["message"], "An internal error occurred");
    assert!(response.body.get("details").is_none());
}

#[tokio::test]
async fn test_development_exposes_store_message() {
    let app = TestApp::with_config(test_config(Environment::Development));
    app.store.set_failing(true);

    let response = app
        .request(
            "POST",
            &app.path("/auth/login"),
            Some(json!({ "email": "x@example.com", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "Store is unavailable");
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let app = TestApp::new();

    let healthy = app.request("GET", "/api/health", None, None).await;
    assert_eq!(healthy.status, StatusCode::OK);
    assert_eq!(healthy.data()["status"], "ok");

    app.store.set_failing(true);
    let down = app.request("GET", "/api/health", None, None).await;
    assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(down.error(), "SERVICE_UNAVAILABLE");

    let missing = app.request("GET", "/api/v1/nowhere", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "130001");
}
