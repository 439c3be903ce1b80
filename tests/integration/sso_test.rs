//! Integration tests for external token login.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use warden_core::config::Environment;
use warden_database::CredentialStore;

use crate::helpers::{SSO_CLIENT_ID, TestApp, test_config};

#[tokio::test]
async fn test_sso_info_has_no_secrets() {
    let app = TestApp::new();
    let response = app
        .request("GET", &app.path("/auth/sso/info"), None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["enabled"], true);
    assert_eq!(data["configured"], true);
    assert_eq!(data["hasClientSecret"], true);
    assert!(!response.body.to_string().contains("integration-sso-secret"));
}

#[tokio::test]
async fn test_sso_login_provisions_once() {
    let app = TestApp::new();
    let token = app.sso_token(json!({
        "userId": 42,
        "email": "Remote@Example.com",
        "role": "USER",
        "aud": SSO_CLIENT_ID,
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
    }));

    let first = app
        .request(
            "POST",
            &app.path("/auth/sso/login"),
            Some(json!({ "ssoToken": token })),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["user"]["email"], "remote@example.com");
    assert_eq!(first.data()["user"]["username"], "remote");
    let access = first.data()["accessToken"].as_str().unwrap().to_string();

    let second = app
        .request(
            "POST",
            &app.path("/auth/sso/login"),
            Some(json!({ "ssoToken": token })),
            None,
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.data()["user"]["id"], second.data()["user"]["id"]);
    assert_eq!(app.store.user_count().await, 1);

    let user = app
        .store
        .find_user_by_email("remote@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.password_hash.is_none());

    let me = app
        .request("GET", &app.path("/auth/me"), None, Some(&access))
        .await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_sso_user_cannot_password_login() {
    let app = TestApp::new();
    let token = app.sso_token(json!({ "sub": "ext-1", "email": "sso@example.com", "role": "USER" }));
    let login = app
        .request(
            "POST",
            &app.path("/auth/sso/login"),
            Some(json!({ "ssoToken": token })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            &app.path("/auth/login"),
            Some(json!({ "email": "sso@example.com", "password": "anything-at-all" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_sso_verify_does_not_provision() {
    let app = TestApp::new();
    let token = app.sso_token(json!({
        "userId": "abc",
        "email": "look@example.com",
        "username": "looker",
        "role": "ADMIN",
        "aud": [SSO_CLIENT_ID, "other"],
    }));

    let response = app
        .request(
            "POST",
            &app.path("/auth/sso/verify"),
            Some(json!({ "ssoToken": token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["valid"], true);
    assert_eq!(response.data()["user"]["username"], "looker");
    assert_eq!(response.data()["user"]["role"], "ADMIN");
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_sso_rejections() {
    let app = TestApp::new();
    let cases = [
        (
            app.sso_token(json!({ "sub": "1", "email": "a@example.com", "role": "USER", "aud": "someone-else" })),
            "INVALID_AUDIENCE",
        ),
        (
            app.sso_token(json!({ "sub": "1", "email": "a@example.com" })),
            "INVALID_TOKEN_PAYLOAD",
        ),
        (
            app.sso_token(json!({ "sub": "1", "email": "a@example.com", "role": "ROOT" })),
            "INVALID_TOKEN_PAYLOAD",
        ),
        (
            app.sso_token(json!({
                "sub": "1",
                "email": "a@example.com",
                "role": "USER",
                "exp": (Utc::now() - Duration::minutes(5)).timestamp(),
            })),
            "TOKEN_EXPIRED",
        ),
        ("not-a-token".to_string(), "INVALID_TOKEN"),
    ];

    for (token, error) in cases {
        let response = app
            .request(
                "POST",
                &app.path("/auth/sso/login"),
                Some(json!({ "ssoToken": token })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{error}");
        assert_eq!(response.error(), error);
    }
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_sso_disabled() {
    let mut config = test_config(Environment::Test);
    config.sso.enabled = false;
    let app = TestApp::with_config(config);
    let token = app.sso_token(json!({ "sub": "1", "email": "a@example.com", "role": "USER" }));

    let response = app
        .request(
            "POST",
            &app.path("/auth/sso/verify"),
            Some(json!({ "ssoToken": token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "SSO_DISABLED");
}

#[tokio::test]
async fn test_sso_for_deactivated_user_is_forbidden() {
    let app = TestApp::new();
    let user = app
        .create_user("gone@example.com", "password123", warden_entity::user::UserRole::User)
        .await;
    app.set_active(&user, false).await;
    let token = app.sso_token(json!({ "sub": "9", "email": "gone@example.com", "role": "USER" }));

    let response = app
        .request(
            "POST",
            &app.path("/auth/sso/login"),
            Some(json!({ "ssoToken": token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
