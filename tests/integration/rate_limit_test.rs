//! Integration tests for per-client request quotas.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use warden_core::config::{Environment, RateLimitConfig, RateLimitRule};
use warden_entity::user::UserRole;

use crate::helpers::{TestApp, test_config};

fn limited_app() -> TestApp {
    let mut config = test_config(Environment::Test);
    config.rate_limit = RateLimitConfig {
        enabled: true,
        login: RateLimitRule::new(5, 60),
        register: RateLimitRule::new(1, 60),
        ..RateLimitConfig::default()
    };
    TestApp::with_config(config)
}

fn login_from(app: &TestApp, ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(app.path("/auth/login"))
        .header("Content-Type", "application/json")
        .header("X-Forwarded-For", ip)
        .body(Body::from(
            json!({ "email": "kim@example.com", "password": "password123" }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_sixth_login_in_a_minute_is_throttled() {
    let app = limited_app();
    app.create_user("kim@example.com", "password123", UserRole::User)
        .await;

    for attempt in 1..=5 {
        let response = app.send(login_from(&app, "203.0.113.9")).await;
        assert_eq!(response.status, StatusCode::OK, "attempt {attempt}");
        assert_eq!(
            response.headers["ratelimit-remaining"],
            (5 - attempt).to_string().as_str()
        );
    }

    let throttled = app.send(login_from(&app, "203.0.113.9")).await;
    assert_eq!(throttled.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(throttled.body["success"], false);
    assert_eq!(throttled.body["error"], "TOO_MANY_REQUESTS");
    assert_eq!(throttled.body["code"], "190001");
    assert!(throttled.headers.contains_key("retry-after"));

    let elsewhere = app.send(login_from(&app, "203.0.113.10")).await;
    assert_eq!(elsewhere.status, StatusCode::OK);
}

#[tokio::test]
async fn test_sso_login_shares_the_login_quota() {
    let app = limited_app();
    app.create_user("kim@example.com", "password123", UserRole::User)
        .await;

    for _ in 0..5 {
        app.login("kim@example.com", "password123").await;
    }

    let token = app.sso_token(json!({
        "userId": "ext-1",
        "email": "remote@example.com",
        "role": "USER",
        "aud": "warden-app",
    }));
    let response = app
        .request(
            "POST",
            &app.path("/auth/sso/login"),
            Some(json!({ "ssoToken": token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_quotas_are_per_route() {
    let app = limited_app();

    let first = app
        .request(
            "POST",
            &app.path("/auth/register"),
            Some(json!({
                "email": "new@example.com",
                "username": "newbie",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .request(
            "POST",
            &app.path("/auth/register"),
            Some(json!({
                "email": "other@example.com",
                "username": "other",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);

    let login = app.login("new@example.com", "password123").await;
    assert!(!login.access.is_empty());
}

#[tokio::test]
async fn test_disabled_limits_never_throttle() {
    let app = TestApp::new();
    app.create_user("kim@example.com", "password123", UserRole::User)
        .await;

    for _ in 0..8 {
        let response = app.send(login_from(&app, "203.0.113.9")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(!response.headers.contains_key("ratelimit-limit"));
    }
}
