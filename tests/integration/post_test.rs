//! Integration tests for post ownership and visibility.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{Session, TestApp};

async fn create_post(app: &TestApp, session: &Session, title: &str, published: bool) -> Value {
    let response = app
        .request(
            "POST",
            &app.path("/posts"),
            Some(json!({ "title": title, "content": "body", "published": published })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.data().clone()
}

#[tokio::test]
async fn test_drafts_are_private() {
    let app = TestApp::new();
    let (_, author) = app.member("author@example.com").await;
    let (_, reader) = app.member("reader@example.com").await;

    let draft = create_post(&app, &author, "Draft", false).await;
    create_post(&app, &author, "Public", true).await;
    let draft_path = app.path(&format!("/posts/{}", draft["id"].as_str().unwrap()));

    let hidden = app
        .request("GET", &draft_path, None, Some(&reader.access))
        .await;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);

    let own = app
        .request("GET", &draft_path, None, Some(&author.access))
        .await;
    assert_eq!(own.status, StatusCode::OK);

    let reader_list = app
        .request("GET", &app.path("/posts"), None, Some(&reader.access))
        .await;
    let titles: Vec<&str> = reader_list
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Public"]);

    let author_list = app
        .request("GET", &app.path("/posts"), None, Some(&author.access))
        .await;
    assert_eq!(author_list.body["meta"]["total"], 2);
}

#[tokio::test]
async fn test_only_owner_or_admin_may_change_a_post() {
    let app = TestApp::new();
    let (_, admin) = app.admin().await;
    let (_, author) = app.member("owner@example.com").await;
    let (_, stranger) = app.member("stranger@example.com").await;

    let post = create_post(&app, &author, "Mine", true).await;
    let path = app.path(&format!("/posts/{}", post["id"].as_str().unwrap()));

    let foreign = app
        .request("PUT", &path, Some(json!({ "title": "Hijacked" })), Some(&stranger.access))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let owned = app
        .request("PUT", &path, Some(json!({ "title": "Renamed" })), Some(&author.access))
        .await;
    assert_eq!(owned.status, StatusCode::OK);
    assert_eq!(owned.data()["title"], "Renamed");

    let foreign_delete = app
        .request("DELETE", &path, None, Some(&stranger.access))
        .await;
    assert_eq!(foreign_delete.status, StatusCode::FORBIDDEN);

    let admin_delete = app.request("DELETE", &path, None, Some(&admin.access)).await;
    assert_eq!(admin_delete.status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_posts_disappear() {
    let app = TestApp::new();
    let (_, author) = app.member("writer@example.com").await;
    let post = create_post(&app, &author, "Short-lived", true).await;
    let path = app.path(&format!("/posts/{}", post["id"].as_str().unwrap()));

    let deleted = app.request("DELETE", &path, None, Some(&author.access)).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app.request("GET", &path, None, Some(&author.access)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let list = app
        .request("GET", &app.path("/posts"), None, Some(&author.access))
        .await;
    assert_eq!(list.body["meta"]["total"], 0);
}

#[tokio::test]
async fn test_post_validation() {
    let app = TestApp::new();
    let (_, author) = app.member("val@example.com").await;

    let response = app
        .request(
            "POST",
            &app.path("/posts"),
            Some(json!({ "title": "", "content": "body" })),
            Some(&author.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["details"].get("title").is_some());
}
