//! Integration tests for the health endpoint.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_returns_200_with_status_ok(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "questline-api");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_memory_app();

    let (status, _) = common::get_json(app, "/api/v1/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
