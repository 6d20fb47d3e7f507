//! Schema migrations.

use questline_core::error::DomainError;
use sqlx::PgPool;
use tracing::info;

/// Applies every pending migration under `migrations/`.
///
/// Idempotent: already-applied migrations are skipped, so this runs on every
/// startup before the server accepts traffic.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))?;
    info!("database schema is up to date");
    Ok(())
}
