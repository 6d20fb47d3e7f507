//! Record store abstractions.
//!
//! Storage is split by record type. Every queue mutation in
//! [`AssignmentRepository`] must be atomic with respect to other mutations
//! of the same character's queue; different characters never contend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::record::{Assignment, Character, CompletedQuest, Quest, QueuedQuest};

/// Computes a character's record after it completes a quest. Stores persist
/// only the returned `experience` and `level`.
pub type RewardRule = dyn Fn(&Character, &Quest) -> Result<Character, DomainError> + Send + Sync;

/// Storage for character records.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Persist a new character.
    ///
    /// Returns `DomainError::Conflict` if another character already uses the
    /// same name.
    async fn insert_character(&self, character: &Character) -> Result<(), DomainError>;

    /// Look up a character by id.
    async fn find_character(&self, id: Uuid) -> Result<Option<Character>, DomainError>;

    /// All characters, in creation order.
    async fn list_characters(&self) -> Result<Vec<Character>, DomainError>;
}

/// Storage for the quest catalog.
#[async_trait]
pub trait QuestRepository: Send + Sync {
    /// Persist a new quest.
    async fn insert_quest(&self, quest: &Quest) -> Result<(), DomainError>;

    /// Look up a quest by id.
    async fn find_quest(&self, id: Uuid) -> Result<Option<Quest>, DomainError>;

    /// All quests, in creation order.
    async fn list_quests(&self) -> Result<Vec<Quest>, DomainError>;
}

/// Storage for the per-character assignment relation.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Append `quest_id` to the back of the character's queue with
    /// `sequence = max + 1`.
    ///
    /// Returns `Conflict` if the pair is already assigned, `NotFound` if the
    /// character or quest is missing, and `ConcurrencyConflict` if the
    /// sequence number was claimed by a concurrent writer.
    async fn enqueue_assignment(
        &self,
        character_id: Uuid,
        quest_id: Uuid,
        assigned_at: DateTime<Utc>,
    ) -> Result<Assignment, DomainError>;

    /// Remove the lowest-sequence assignment and shift every later one down
    /// by one. Returns `None` when the queue is empty.
    async fn dequeue_assignment(
        &self,
        character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError>;

    /// Remove the lowest-sequence assignment and write the progression
    /// `reward` computes for its quest, as one atomic step.
    ///
    /// Returns `None` when the queue is empty. If `reward` fails, neither
    /// the queue nor the character changes and its error is returned.
    async fn complete_assignment(
        &self,
        character_id: Uuid,
        reward: &RewardRule,
    ) -> Result<Option<CompletedQuest>, DomainError>;

    /// The lowest-sequence assignment, without removing it.
    async fn peek_assignment(&self, character_id: Uuid)
    -> Result<Option<QueuedQuest>, DomainError>;

    /// Number of live assignments for the character.
    async fn count_assignments(&self, character_id: Uuid) -> Result<usize, DomainError>;

    /// Every live assignment for the character, ascending by sequence.
    async fn list_assignments(&self, character_id: Uuid)
    -> Result<Vec<QueuedQuest>, DomainError>;
}

/// The complete record store handed to application handlers.
pub trait RecordStore: CharacterRepository + QuestRepository + AssignmentRepository {}

impl<T> RecordStore for T where T: CharacterRepository + QuestRepository + AssignmentRepository + ?Sized
{}
