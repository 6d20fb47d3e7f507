//! Command handlers for the quest context.
//!
//! Each handler validates the command, delegates ordering to the character's
//! [`QuestQueue`], and returns the affected record.

use questline_character::domain::progression::reward_for_quest;
use questline_core::clock::Clock;
use questline_core::error::DomainError;
use questline_core::record::{Character, Quest};
use questline_core::repository::RecordStore;
use tracing::{info, instrument};

use crate::domain::commands::{AcceptQuest, CompleteQuest, CreateQuest};
use crate::domain::queue::QuestQueue;

/// Handles the `CreateQuest` command: validates and persists a catalog entry.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank title or a negative reward.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_create_quest(
    command: &CreateQuest,
    store: &dyn RecordStore,
) -> Result<Quest, DomainError> {
    let title = command.title.trim();
    if title.is_empty() {
        return Err(DomainError::Validation("quest title must not be empty".into()));
    }
    if command.xp_reward < 0 {
        return Err(DomainError::Validation(
            "quest xp_reward must not be negative".into(),
        ));
    }

    let quest = Quest {
        id: command.quest_id,
        title: title.to_owned(),
        description: command.description.clone(),
        xp_reward: command.xp_reward,
        difficulty: command.difficulty,
    };
    store.insert_quest(&quest).await?;

    info!(quest_id = %quest.id, "quest created");
    Ok(quest)
}

/// Handles the `AcceptQuest` command: appends the quest to the back of the
/// character's queue.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character or quest is missing and
/// `DomainError::Conflict` if the character already holds the quest.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        character_id = %command.character_id,
        quest_id = %command.quest_id,
    )
)]
pub async fn handle_accept_quest(
    command: &AcceptQuest,
    clock: &dyn Clock,
    store: &dyn RecordStore,
) -> Result<Quest, DomainError> {
    let queue = QuestQueue::new(command.character_id, store, clock);
    let quest = queue.enqueue(command.quest_id).await?;

    info!("quest accepted");
    Ok(quest)
}

/// Handles the `CompleteQuest` command: removes the oldest quest from the
/// character's queue and awards its experience as one atomic step.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character is missing,
/// `DomainError::EmptyQueue` if it has no pending quests, and
/// `DomainError::Validation` if the reward would overflow its experience.
/// On any error the quest stays queued.
#[instrument(
    skip_all,
    fields(correlation_id = %command.correlation_id, character_id = %command.character_id)
)]
pub async fn handle_complete_quest(
    command: &CompleteQuest,
    clock: &dyn Clock,
    store: &dyn RecordStore,
) -> Result<Character, DomainError> {
    let before = store
        .find_character(command.character_id)
        .await?
        .ok_or_else(|| DomainError::character_not_found(command.character_id))?;

    let queue = QuestQueue::new(command.character_id, store, clock);
    let completed = queue.complete(&reward_for_quest).await?;
    let character = completed.character;

    info!(
        quest_id = %completed.queued.quest.id,
        xp_reward = completed.queued.quest.xp_reward,
        experience = character.experience,
        "quest completed"
    );
    if character.level > before.level {
        info!(from = before.level, to = character.level, "character leveled up");
    }
    Ok(character)
}
