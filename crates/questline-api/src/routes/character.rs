//! Routes for characters and their quest queues.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use questline_character::application::{command_handlers, query_handlers};
use questline_character::domain::commands::{self, DEFAULT_EXPERIENCE, DEFAULT_LEVEL};
use questline_core::record::{Character, Quest};
use questline_quests::application::command_handlers as quest_commands;
use questline_quests::application::query_handlers as quest_queries;
use questline_quests::domain::commands::{AcceptQuest, CompleteQuest};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /personajes.
#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    /// Unique display name.
    pub name: String,
    /// Free-text class tag.
    pub class: String,
    /// Starting level; defaults to 1.
    #[serde(default)]
    pub level: Option<i32>,
    /// Starting experience; defaults to 0.
    #[serde(default)]
    pub experience: Option<i32>,
}

/// POST /personajes
#[instrument(skip(state, request), fields(name = %request.name))]
async fn create_character(
    State(state): State<AppState>,
    Json(request): Json<CreateCharacterRequest>,
) -> Result<Json<Character>, ApiError> {
    let command = commands::CreateCharacter {
        correlation_id: Uuid::new_v4(),
        character_id: Uuid::now_v7(),
        name: request.name,
        class: request.class,
        level: request.level.unwrap_or(DEFAULT_LEVEL),
        experience: request.experience.unwrap_or(DEFAULT_EXPERIENCE),
    };

    info!(correlation_id = %command.correlation_id, "handling create_character command");

    let character = command_handlers::handle_create_character(&command, &*state.store).await?;
    Ok(Json(character))
}

/// GET /personajes
#[instrument(skip(state))]
async fn list_characters(State(state): State<AppState>) -> Result<Json<Vec<Character>>, ApiError> {
    let characters = query_handlers::list_characters(&*state.store).await?;
    Ok(Json(characters))
}

/// GET /personajes/{character_id}
#[instrument(skip(state))]
async fn get_character(
    State(state): State<AppState>,
    Path(character_id): Path<Uuid>,
) -> Result<Json<Character>, ApiError> {
    let character = query_handlers::get_character_by_id(character_id, &*state.store).await?;
    Ok(Json(character))
}

/// POST /personajes/{character_id}/misiones/{quest_id}
#[instrument(skip(state))]
async fn accept_quest(
    State(state): State<AppState>,
    Path((character_id, quest_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Quest>, ApiError> {
    let command = AcceptQuest {
        correlation_id: Uuid::new_v4(),
        character_id,
        quest_id,
    };

    info!(correlation_id = %command.correlation_id, "handling accept_quest command");

    let quest =
        quest_commands::handle_accept_quest(&command, state.clock.as_ref(), &*state.store).await?;
    Ok(Json(quest))
}

/// POST /personajes/{character_id}/completar
#[instrument(skip(state))]
async fn complete_quest(
    State(state): State<AppState>,
    Path(character_id): Path<Uuid>,
) -> Result<Json<Character>, ApiError> {
    let command = CompleteQuest {
        correlation_id: Uuid::new_v4(),
        character_id,
    };

    info!(correlation_id = %command.correlation_id, "handling complete_quest command");

    let character =
        quest_commands::handle_complete_quest(&command, state.clock.as_ref(), &*state.store)
            .await?;
    Ok(Json(character))
}

/// GET /personajes/{character_id}/misiones
#[instrument(skip(state))]
async fn list_character_quests(
    State(state): State<AppState>,
    Path(character_id): Path<Uuid>,
) -> Result<Json<Vec<Quest>>, ApiError> {
    let quests = quest_queries::list_character_quests(character_id, &*state.store).await?;
    Ok(Json(quests))
}

/// GET /personajes/{character_id}/misiones/siguiente
#[instrument(skip(state))]
async fn next_quest(
    State(state): State<AppState>,
    Path(character_id): Path<Uuid>,
) -> Result<Json<Quest>, ApiError> {
    let quest = quest_queries::next_quest_for_character(character_id, &*state.store).await?;
    Ok(Json(quest))
}

/// Returns the router for characters and their quest queues.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/personajes", post(create_character).get(list_characters))
        .route("/personajes/{character_id}", get(get_character))
        .route(
            "/personajes/{character_id}/misiones",
            get(list_character_quests),
        )
        .route(
            "/personajes/{character_id}/misiones/siguiente",
            get(next_quest),
        )
        .route(
            "/personajes/{character_id}/misiones/{quest_id}",
            post(accept_quest),
        )
        .route("/personajes/{character_id}/completar", post(complete_quest))
}
