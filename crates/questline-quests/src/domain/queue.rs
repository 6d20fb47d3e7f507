//! The per-character quest queue.
//!
//! A `QuestQueue` is bound to one character and orders that character's
//! accepted quests first-in, first-out. Positions are explicit sequence
//! numbers kept contiguous from 1; the record store makes each mutation
//! atomic per character, and this type retries the rare lost race.

use std::future::Future;

use questline_core::clock::Clock;
use questline_core::error::DomainError;
use questline_core::record::{CompletedQuest, Quest};
use questline_core::repository::{RecordStore, RewardRule};
use tracing::{debug, warn};
use uuid::Uuid;

/// Attempts made for a queue mutation that keeps losing sequence races.
pub const MAX_QUEUE_ATTEMPTS: u32 = 3;

/// FIFO queue of accepted quests for a single character.
pub struct QuestQueue<'a> {
    character_id: Uuid,
    store: &'a dyn RecordStore,
    clock: &'a dyn Clock,
}

impl<'a> QuestQueue<'a> {
    /// Binds a queue view to `character_id`.
    #[must_use]
    pub fn new(character_id: Uuid, store: &'a dyn RecordStore, clock: &'a dyn Clock) -> Self {
        Self {
            character_id,
            store,
            clock,
        }
    }

    /// The character this queue belongs to.
    #[must_use]
    pub fn character_id(&self) -> Uuid {
        self.character_id
    }

    /// Appends `quest_id` to the back of the queue.
    ///
    /// # Errors
    ///
    /// `NotFound` if the quest or the character does not exist, `Conflict`
    /// if the quest is already queued for this character or the sequence
    /// race could not be won within [`MAX_QUEUE_ATTEMPTS`].
    pub async fn enqueue(&self, quest_id: Uuid) -> Result<Quest, DomainError> {
        let quest = self
            .store
            .find_quest(quest_id)
            .await?
            .ok_or_else(|| DomainError::quest_not_found(quest_id))?;
        if self.store.find_character(self.character_id).await?.is_none() {
            return Err(DomainError::character_not_found(self.character_id));
        }

        let assigned_at = self.clock.now();
        let assignment = self
            .retrying("enqueue", || {
                self.store
                    .enqueue_assignment(self.character_id, quest_id, assigned_at)
            })
            .await?;

        debug!(
            character_id = %self.character_id,
            quest_id = %quest_id,
            sequence = assignment.sequence,
            "quest enqueued"
        );
        Ok(quest)
    }

    /// Removes and returns the oldest queued quest.
    ///
    /// # Errors
    ///
    /// `EmptyQueue` if nothing is queued, `NotFound` if the character does
    /// not exist.
    pub async fn dequeue(&self) -> Result<Quest, DomainError> {
        let removed = self
            .retrying("dequeue", || self.store.dequeue_assignment(self.character_id))
            .await?
            .ok_or(DomainError::EmptyQueue(self.character_id))?;

        debug!(
            character_id = %self.character_id,
            quest_id = %removed.quest.id,
            "quest dequeued"
        );
        Ok(removed.quest)
    }

    /// Removes the oldest queued quest and writes the progression `reward`
    /// computes for it, in one atomic step. A failing `reward` leaves both
    /// the queue and the character untouched.
    ///
    /// # Errors
    ///
    /// `EmptyQueue` if nothing is queued, `NotFound` if the character does
    /// not exist, or whatever `reward` returns.
    pub async fn complete(&self, reward: &RewardRule) -> Result<CompletedQuest, DomainError> {
        let completed = self
            .retrying("complete", || {
                self.store.complete_assignment(self.character_id, reward)
            })
            .await?
            .ok_or(DomainError::EmptyQueue(self.character_id))?;

        debug!(
            character_id = %self.character_id,
            quest_id = %completed.queued.quest.id,
            "quest completed"
        );
        Ok(completed)
    }

    /// The oldest queued quest, without removing it.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn peek(&self) -> Result<Option<Quest>, DomainError> {
        Ok(self
            .store
            .peek_assignment(self.character_id)
            .await?
            .map(|queued| queued.quest))
    }

    /// Whether no quest is queued.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.size().await? == 0)
    }

    /// Number of queued quests.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn size(&self) -> Result<usize, DomainError> {
        self.store.count_assignments(self.character_id).await
    }

    /// Every queued quest, oldest first. Each call reads fresh state.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn list_all(&self) -> Result<Vec<Quest>, DomainError> {
        Ok(self
            .store
            .list_assignments(self.character_id)
            .await?
            .into_iter()
            .map(|queued| queued.quest)
            .collect())
    }

    /// Runs `op`, repeating it while it reports `ConcurrencyConflict`.
    async fn retrying<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(DomainError::ConcurrencyConflict { .. }) if attempt < MAX_QUEUE_ATTEMPTS => {
                    warn!(
                        character_id = %self.character_id,
                        operation,
                        attempt,
                        "quest queue contended, retrying"
                    );
                    attempt += 1;
                }
                Err(DomainError::ConcurrencyConflict { .. }) => {
                    return Err(DomainError::Conflict(format!(
                        "quest queue for character {} is busy; {operation} gave up after {attempt} attempts",
                        self.character_id
                    )));
                }
                result => return result,
            }
        }
    }
}
