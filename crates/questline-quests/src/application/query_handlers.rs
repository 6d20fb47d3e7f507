//! Query handlers for the quest context.
//!
//! Read-only views over the quest catalog and a character's quest queue.

use questline_core::clock::SystemClock;
use questline_core::error::DomainError;
use questline_core::record::Quest;
use questline_core::repository::RecordStore;
use uuid::Uuid;

use crate::domain::queue::QuestQueue;

/// Retrieves a quest by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no quest has the id.
pub async fn get_quest_by_id(quest_id: Uuid, store: &dyn RecordStore) -> Result<Quest, DomainError> {
    store
        .find_quest(quest_id)
        .await?
        .ok_or_else(|| DomainError::quest_not_found(quest_id))
}

/// Lists the whole quest catalog in creation order.
///
/// # Errors
///
/// Propagates store failures.
pub async fn list_quest_catalog(store: &dyn RecordStore) -> Result<Vec<Quest>, DomainError> {
    store.list_quests().await
}

/// Lists a character's pending quests, oldest accepted first.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character does not exist.
pub async fn list_character_quests(
    character_id: Uuid,
    store: &dyn RecordStore,
) -> Result<Vec<Quest>, DomainError> {
    ensure_character(character_id, store).await?;
    QuestQueue::new(character_id, store, &SystemClock)
        .list_all()
        .await
}

/// The quest at the head of a character's queue.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character does not exist and
/// `DomainError::EmptyQueue` if nothing is queued.
pub async fn next_quest_for_character(
    character_id: Uuid,
    store: &dyn RecordStore,
) -> Result<Quest, DomainError> {
    ensure_character(character_id, store).await?;
    QuestQueue::new(character_id, store, &SystemClock)
        .peek()
        .await?
        .ok_or(DomainError::EmptyQueue(character_id))
}

async fn ensure_character(character_id: Uuid, store: &dyn RecordStore) -> Result<(), DomainError> {
    match store.find_character(character_id).await? {
        Some(_) => Ok(()),
        None => Err(DomainError::character_not_found(character_id)),
    }
}
