//! Questline API: HTTP surface for characters, quests, and quest queues.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use crate::state::AppState;

/// Builds the application router with every route mounted at its public path.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::character::router())
        .merge(routes::quest::router())
        .with_state(state)
}
