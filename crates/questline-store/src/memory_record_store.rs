//! In-memory implementation of the record store traits.
//!
//! Each character's queue lives in its own [`QueueLedger`] behind its own
//! mutex, so queue mutations for one character are serialized while other
//! characters proceed in parallel. Locks are never held across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use questline_core::error::DomainError;
use questline_core::ledger::QueueLedger;
use questline_core::record::{Assignment, Character, CompletedQuest, Quest, QueuedQuest};
use questline_core::repository::{
    AssignmentRepository, CharacterRepository, QuestRepository, RewardRule,
};

/// Process-local record store.
///
/// Records are keyed by their v7 ids, so map order is creation order.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    characters: RwLock<BTreeMap<Uuid, Character>>,
    quests: RwLock<BTreeMap<Uuid, Quest>>,
    queues: Mutex<HashMap<Uuid, Arc<Mutex<QueueLedger>>>>,
}

fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::Infrastructure("in-memory store lock poisoned".into())
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ledger for `character_id`, creating it on first use.
    fn ledger(&self, character_id: Uuid) -> Result<Arc<Mutex<QueueLedger>>, DomainError> {
        let mut queues = self.queues.lock().map_err(poisoned)?;
        Ok(Arc::clone(queues.entry(character_id).or_insert_with(|| {
            Arc::new(Mutex::new(QueueLedger::new(character_id)))
        })))
    }

    /// Returns the ledger for `character_id` if one was ever created. Reads
    /// go through here so unknown ids never allocate a ledger.
    fn existing_ledger(
        &self,
        character_id: Uuid,
    ) -> Result<Option<Arc<Mutex<QueueLedger>>>, DomainError> {
        Ok(self
            .queues
            .lock()
            .map_err(poisoned)?
            .get(&character_id)
            .map(Arc::clone))
    }

    fn character_exists(&self, character_id: Uuid) -> Result<bool, DomainError> {
        Ok(self
            .characters
            .read()
            .map_err(poisoned)?
            .contains_key(&character_id))
    }

    fn join_quest(&self, assignment: Assignment) -> Result<QueuedQuest, DomainError> {
        let quest = self
            .quests
            .read()
            .map_err(poisoned)?
            .get(&assignment.quest_id)
            .cloned()
            .ok_or_else(|| DomainError::quest_not_found(assignment.quest_id))?;
        Ok(QueuedQuest { assignment, quest })
    }
}

#[async_trait]
impl CharacterRepository for InMemoryRecordStore {
    async fn insert_character(&self, character: &Character) -> Result<(), DomainError> {
        let mut characters = self.characters.write().map_err(poisoned)?;
        if characters.values().any(|c| c.name == character.name) {
            return Err(DomainError::Conflict(format!(
                "a character named '{}' already exists",
                character.name
            )));
        }
        characters.insert(character.id, character.clone());
        Ok(())
    }

    async fn find_character(&self, id: Uuid) -> Result<Option<Character>, DomainError> {
        Ok(self.characters.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn list_characters(&self) -> Result<Vec<Character>, DomainError> {
        Ok(self
            .characters
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuestRepository for InMemoryRecordStore {
    async fn insert_quest(&self, quest: &Quest) -> Result<(), DomainError> {
        self.quests
            .write()
            .map_err(poisoned)?
            .insert(quest.id, quest.clone());
        Ok(())
    }

    async fn find_quest(&self, id: Uuid) -> Result<Option<Quest>, DomainError> {
        Ok(self.quests.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn list_quests(&self) -> Result<Vec<Quest>, DomainError> {
        Ok(self
            .quests
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRecordStore {
    async fn enqueue_assignment(
        &self,
        character_id: Uuid,
        quest_id: Uuid,
        assigned_at: DateTime<Utc>,
    ) -> Result<Assignment, DomainError> {
        if !self.character_exists(character_id)? {
            return Err(DomainError::character_not_found(character_id));
        }
        if !self.quests.read().map_err(poisoned)?.contains_key(&quest_id) {
            return Err(DomainError::quest_not_found(quest_id));
        }

        let ledger = self.ledger(character_id)?;
        let mut ledger = ledger.lock().map_err(poisoned)?;
        ledger.push_back(quest_id, assigned_at)
    }

    async fn dequeue_assignment(
        &self,
        character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        if !self.character_exists(character_id)? {
            return Err(DomainError::character_not_found(character_id));
        }

        let Some(ledger) = self.existing_ledger(character_id)? else {
            return Ok(None);
        };
        let removed = ledger.lock().map_err(poisoned)?.pop_front();
        removed.map(|a| self.join_quest(a)).transpose()
    }

    async fn complete_assignment(
        &self,
        character_id: Uuid,
        reward: &RewardRule,
    ) -> Result<Option<CompletedQuest>, DomainError> {
        if !self.character_exists(character_id)? {
            return Err(DomainError::character_not_found(character_id));
        }
        let Some(ledger) = self.existing_ledger(character_id)? else {
            return Ok(None);
        };

        // Ledger before characters, the same order every writer uses.
        let mut ledger = ledger.lock().map_err(poisoned)?;
        let Some(head) = ledger.front().cloned() else {
            return Ok(None);
        };
        let queued = self.join_quest(head)?;

        let mut characters = self.characters.write().map_err(poisoned)?;
        let stored = characters
            .get_mut(&character_id)
            .ok_or_else(|| DomainError::character_not_found(character_id))?;
        let rewarded = reward(&*stored, &queued.quest)?;
        stored.experience = rewarded.experience;
        stored.level = rewarded.level;
        let character = stored.clone();
        drop(characters);

        ledger.pop_front();
        Ok(Some(CompletedQuest { queued, character }))
    }

    async fn peek_assignment(
        &self,
        character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        let Some(ledger) = self.existing_ledger(character_id)? else {
            return Ok(None);
        };
        let head = ledger.lock().map_err(poisoned)?.front().cloned();
        head.map(|a| self.join_quest(a)).transpose()
    }

    async fn count_assignments(&self, character_id: Uuid) -> Result<usize, DomainError> {
        let Some(ledger) = self.existing_ledger(character_id)? else {
            return Ok(0);
        };
        let len = ledger.lock().map_err(poisoned)?.len();
        Ok(len)
    }

    async fn list_assignments(
        &self,
        character_id: Uuid,
    ) -> Result<Vec<QueuedQuest>, DomainError> {
        let Some(ledger) = self.existing_ledger(character_id)? else {
            return Ok(Vec::new());
        };
        let entries: Vec<Assignment> = ledger.lock().map_err(poisoned)?.iter().cloned().collect();
        entries.into_iter().map(|a| self.join_quest(a)).collect()
    }
}
