//! Routes for the quest catalog.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use questline_core::record::Quest;
use questline_quests::application::{command_handlers, query_handlers};
use questline_quests::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /misiones.
#[derive(Debug, Deserialize)]
pub struct CreateQuestRequest {
    /// Quest title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Experience granted on completion.
    pub xp_reward: i32,
    /// Difficulty rating.
    pub difficulty: i32,
}

/// POST /misiones
#[instrument(skip(state, request), fields(title = %request.title))]
async fn create_quest(
    State(state): State<AppState>,
    Json(request): Json<CreateQuestRequest>,
) -> Result<Json<Quest>, ApiError> {
    let command = commands::CreateQuest {
        correlation_id: Uuid::new_v4(),
        quest_id: Uuid::now_v7(),
        title: request.title,
        description: request.description,
        xp_reward: request.xp_reward,
        difficulty: request.difficulty,
    };

    info!(correlation_id = %command.correlation_id, "handling create_quest command");

    let quest = command_handlers::handle_create_quest(&command, &*state.store).await?;
    Ok(Json(quest))
}

/// GET /misiones
#[instrument(skip(state))]
async fn list_quests(State(state): State<AppState>) -> Result<Json<Vec<Quest>>, ApiError> {
    let quests = query_handlers::list_quest_catalog(&*state.store).await?;
    Ok(Json(quests))
}

/// GET /misiones/{quest_id}
#[instrument(skip(state))]
async fn get_quest(
    State(state): State<AppState>,
    Path(quest_id): Path<Uuid>,
) -> Result<Json<Quest>, ApiError> {
    let quest = query_handlers::get_quest_by_id(quest_id, &*state.store).await?;
    Ok(Json(quest))
}

/// Returns the router for the quest catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/misiones", post(create_quest).get(list_quests))
        .route("/misiones/{quest_id}", get(get_quest))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use questline_core::clock::Clock;
    use questline_store::InMemoryRecordStore;
    use questline_test_support::FixedClock;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app_state() -> AppState {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock::default());
        AppState::new(clock, Arc::new(InMemoryRecordStore::new()))
    }

    async fn post_quest(state: &AppState, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/misiones")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();

        let response = router()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap_or(Value::Null))
    }

    async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = router()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_create_quest_returns_200_with_quest() {
        // Arrange
        let state = test_app_state();
        let body = serde_json::json!({
            "title": "Slay Rat",
            "description": "The cellar is overrun",
            "xp_reward": 50,
            "difficulty": 1,
        });

        // Act
        let (status, json) = post_quest(&state, &body).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Slay Rat");
        assert_eq!(json["xp_reward"], 50);
        let quest_id = json["id"].as_str().unwrap();
        let (status, fetched) = get(&state, &format!("/misiones/{quest_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, json);
    }

    #[tokio::test]
    async fn test_create_quest_with_negative_reward_returns_400() {
        let state = test_app_state();
        let body = serde_json::json!({ "title": "Slay Rat", "xp_reward": -5, "difficulty": 1 });

        let (status, json) = post_quest(&state, &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["message"], "validation error: quest xp_reward must not be negative");
    }

    #[tokio::test]
    async fn test_list_quests_preserves_creation_order() {
        // Arrange
        let state = test_app_state();
        for title in ["Slay Rat", "Find Sword", "Escort Merchant"] {
            let body = serde_json::json!({ "title": title, "xp_reward": 10, "difficulty": 1 });
            post_quest(&state, &body).await;
        }

        // Act
        let (status, json) = get(&state, "/misiones").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Slay Rat", "Find Sword", "Escort Merchant"]);
    }

    #[tokio::test]
    async fn test_get_unknown_quest_returns_404() {
        let state = test_app_state();

        let (status, json) = get(&state, &format!("/misiones/{}", Uuid::now_v7())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }
}
