//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use questline_core::clock::Clock;
use questline_store::{InMemoryRecordStore, PgRecordStore};
use questline_test_support::FixedClock;
use sqlx::PgPool;
use tower::ServiceExt;

use questline_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock::default())
}

/// Build the full app router over a real `PgRecordStore` and a fixed clock.
/// Uses the same route structure as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let store = Arc::new(PgRecordStore::new(pool));
    questline_api::app(AppState::new(fixed_clock(), store))
}

/// Build the full app router over a fresh in-memory store.
pub fn build_memory_app() -> Router {
    questline_api::app(AppState::new(
        fixed_clock(),
        Arc::new(InMemoryRecordStore::new()),
    ))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Create a character through the API and return its id.
pub async fn create_character(app: Router, name: &str) -> String {
    let (status, json) = post_json(
        app,
        "/personajes",
        &serde_json::json!({ "name": name, "class": "warrior" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create_character failed: {json}");
    json["id"].as_str().unwrap().to_owned()
}

/// Create a quest through the API and return its id.
pub async fn create_quest(app: Router, title: &str, xp_reward: i32) -> String {
    let (status, json) = post_json(
        app,
        "/misiones",
        &serde_json::json!({
            "title": title,
            "description": format!("{title}, as posted on the tavern board"),
            "xp_reward": xp_reward,
            "difficulty": 1,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create_quest failed: {json}");
    json["id"].as_str().unwrap().to_owned()
}
