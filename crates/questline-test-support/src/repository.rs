//! Test repositories: record store doubles for tests.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use questline_core::record::{Assignment, Character, CompletedQuest, Quest, QueuedQuest};
use questline_core::repository::{
    AssignmentRepository, CharacterRepository, QuestRepository, RewardRule,
};
use questline_store::InMemoryRecordStore;
use uuid::Uuid;

/// A record store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingRecordStore;

fn connection_refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

#[async_trait]
impl CharacterRepository for FailingRecordStore {
    async fn insert_character(&self, _character: &Character) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn find_character(&self, _id: Uuid) -> Result<Option<Character>, DomainError> {
        Err(connection_refused())
    }

    async fn list_characters(&self) -> Result<Vec<Character>, DomainError> {
        Err(connection_refused())
    }
}

#[async_trait]
impl QuestRepository for FailingRecordStore {
    async fn insert_quest(&self, _quest: &Quest) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn find_quest(&self, _id: Uuid) -> Result<Option<Quest>, DomainError> {
        Err(connection_refused())
    }

    async fn list_quests(&self) -> Result<Vec<Quest>, DomainError> {
        Err(connection_refused())
    }
}

#[async_trait]
impl AssignmentRepository for FailingRecordStore {
    async fn enqueue_assignment(
        &self,
        _character_id: Uuid,
        _quest_id: Uuid,
        _assigned_at: DateTime<Utc>,
    ) -> Result<Assignment, DomainError> {
        Err(connection_refused())
    }

    async fn dequeue_assignment(
        &self,
        _character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        Err(connection_refused())
    }

    async fn complete_assignment(
        &self,
        _character_id: Uuid,
        _reward: &RewardRule,
    ) -> Result<Option<CompletedQuest>, DomainError> {
        Err(connection_refused())
    }

    async fn peek_assignment(
        &self,
        _character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        Err(connection_refused())
    }

    async fn count_assignments(&self, _character_id: Uuid) -> Result<usize, DomainError> {
        Err(connection_refused())
    }

    async fn list_assignments(
        &self,
        _character_id: Uuid,
    ) -> Result<Vec<QueuedQuest>, DomainError> {
        Err(connection_refused())
    }
}

/// An in-memory record store that simulates losing races.
///
/// The first `queue_conflicts` queue mutations fail with
/// `ConcurrencyConflict` before delegating to a real
/// [`InMemoryRecordStore`]. Counts every attempt so tests can assert on
/// retry behaviour.
#[derive(Debug, Default)]
pub struct ContendedRecordStore {
    inner: InMemoryRecordStore,
    queue_conflicts: AtomicU32,
    queue_attempts: AtomicU32,
}

impl ContendedRecordStore {
    /// Creates a store whose first `queue_conflicts` queue mutations fail.
    #[must_use]
    pub fn new(queue_conflicts: u32) -> Self {
        Self {
            queue_conflicts: AtomicU32::new(queue_conflicts),
            ..Self::default()
        }
    }

    /// The wrapped store, for seeding records without side effects.
    #[must_use]
    pub fn inner(&self) -> &InMemoryRecordStore {
        &self.inner
    }

    /// Total queue mutations seen, including failed ones.
    #[must_use]
    pub fn queue_attempts(&self) -> u32 {
        self.queue_attempts.load(Ordering::SeqCst)
    }

    /// Consumes one pending failure, returning whether one was available.
    fn take_failure(&self) -> bool {
        self.queue_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl CharacterRepository for ContendedRecordStore {
    async fn insert_character(&self, character: &Character) -> Result<(), DomainError> {
        self.inner.insert_character(character).await
    }

    async fn find_character(&self, id: Uuid) -> Result<Option<Character>, DomainError> {
        self.inner.find_character(id).await
    }

    async fn list_characters(&self) -> Result<Vec<Character>, DomainError> {
        self.inner.list_characters().await
    }
}

#[async_trait]
impl QuestRepository for ContendedRecordStore {
    async fn insert_quest(&self, quest: &Quest) -> Result<(), DomainError> {
        self.inner.insert_quest(quest).await
    }

    async fn find_quest(&self, id: Uuid) -> Result<Option<Quest>, DomainError> {
        self.inner.find_quest(id).await
    }

    async fn list_quests(&self) -> Result<Vec<Quest>, DomainError> {
        self.inner.list_quests().await
    }
}

#[async_trait]
impl AssignmentRepository for ContendedRecordStore {
    async fn enqueue_assignment(
        &self,
        character_id: Uuid,
        quest_id: Uuid,
        assigned_at: DateTime<Utc>,
    ) -> Result<Assignment, DomainError> {
        self.queue_attempts.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(DomainError::ConcurrencyConflict { character_id });
        }
        self.inner
            .enqueue_assignment(character_id, quest_id, assigned_at)
            .await
    }

    async fn dequeue_assignment(
        &self,
        character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        self.queue_attempts.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(DomainError::ConcurrencyConflict { character_id });
        }
        self.inner.dequeue_assignment(character_id).await
    }

    async fn complete_assignment(
        &self,
        character_id: Uuid,
        reward: &RewardRule,
    ) -> Result<Option<CompletedQuest>, DomainError> {
        self.queue_attempts.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(DomainError::ConcurrencyConflict { character_id });
        }
        self.inner.complete_assignment(character_id, reward).await
    }

    async fn peek_assignment(
        &self,
        character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        self.inner.peek_assignment(character_id).await
    }

    async fn count_assignments(&self, character_id: Uuid) -> Result<usize, DomainError> {
        self.inner.count_assignments(character_id).await
    }

    async fn list_assignments(
        &self,
        character_id: Uuid,
    ) -> Result<Vec<QueuedQuest>, DomainError> {
        self.inner.list_assignments(character_id).await
    }
}
