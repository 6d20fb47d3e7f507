//! Questline API server entry point.

use std::error::Error;
use std::sync::Arc;

use questline_api::config::{AppConfig, StoreBackend};
use questline_api::error::AppError;
use questline_api::state::AppState;
use questline_api::telemetry;
use questline_core::clock::SystemClock;
use questline_core::repository::RecordStore;
use questline_store::{InMemoryRecordStore, PgRecordStore, run_migrations};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Questline API server");

    let store = connect_store(&config.store).await?;
    let app_state = AppState::new(Arc::new(SystemClock), store);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = questline_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(AppError::from)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::from)?;

    tracing::info!("Questline API server stopped");
    telemetry.shutdown();
    Ok(())
}

async fn connect_store(backend: &StoreBackend) -> Result<Arc<dyn RecordStore>, AppError> {
    match backend {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await?;
            run_migrations(&pool).await?;
            tracing::info!(max_connections, "connected to PostgreSQL record store");
            Ok(Arc::new(PgRecordStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory record store; data will not survive a restart");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
