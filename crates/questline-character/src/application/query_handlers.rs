//! Query handlers for the character context.

use questline_core::error::DomainError;
use questline_core::record::Character;
use questline_core::repository::RecordStore;
use uuid::Uuid;

/// Retrieves a character by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no character has the id.
pub async fn get_character_by_id(
    character_id: Uuid,
    store: &dyn RecordStore,
) -> Result<Character, DomainError> {
    store
        .find_character(character_id)
        .await?
        .ok_or_else(|| DomainError::character_not_found(character_id))
}

/// Lists every character in creation order.
///
/// # Errors
///
/// Propagates store failures.
pub async fn list_characters(store: &dyn RecordStore) -> Result<Vec<Character>, DomainError> {
    store.list_characters().await
}
