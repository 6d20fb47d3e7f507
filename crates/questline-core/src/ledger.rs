//! In-memory ordering ledger for a single character's quest queue.
//!
//! Entries are kept in ascending `sequence` order. After every mutation the
//! sequences form exactly `1..=len` with no gaps or duplicates.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::record::Assignment;

/// The ordered assignments of one character.
#[derive(Debug, Clone)]
pub struct QueueLedger {
    character_id: Uuid,
    entries: VecDeque<Assignment>,
}

impl QueueLedger {
    /// Creates an empty ledger bound to `character_id`.
    #[must_use]
    pub fn new(character_id: Uuid) -> Self {
        Self {
            character_id,
            entries: VecDeque::new(),
        }
    }

    /// The character this ledger belongs to.
    #[must_use]
    pub fn character_id(&self) -> Uuid {
        self.character_id
    }

    /// Number of queued assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `quest_id` is currently queued.
    #[must_use]
    pub fn contains(&self, quest_id: Uuid) -> bool {
        self.entries.iter().any(|a| a.quest_id == quest_id)
    }

    /// Highest sequence in use, or 0 for an empty queue.
    #[must_use]
    pub fn max_sequence(&self) -> i64 {
        self.entries.back().map_or(0, |a| a.sequence)
    }

    /// Appends `quest_id` with `sequence = max + 1`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` if the quest is already queued.
    pub fn push_back(
        &mut self,
        quest_id: Uuid,
        assigned_at: DateTime<Utc>,
    ) -> Result<Assignment, DomainError> {
        if self.contains(quest_id) {
            return Err(DomainError::Conflict(format!(
                "quest {quest_id} is already assigned to character {}",
                self.character_id
            )));
        }

        let assignment = Assignment {
            character_id: self.character_id,
            quest_id,
            sequence: self.max_sequence() + 1,
            assigned_at,
        };
        self.entries.push_back(assignment.clone());
        Ok(assignment)
    }

    /// Removes the lowest-sequence entry and compacts the remainder so the
    /// sequences stay contiguous from 1.
    pub fn pop_front(&mut self) -> Option<Assignment> {
        let removed = self.entries.pop_front()?;
        for entry in &mut self.entries {
            if entry.sequence > removed.sequence {
                entry.sequence -= 1;
            }
        }
        Some(removed)
    }

    /// The lowest-sequence entry.
    #[must_use]
    pub fn front(&self) -> Option<&Assignment> {
        self.entries.front()
    }

    /// Entries in ascending sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.entries.iter()
    }

    /// Whether the sequences are exactly `1..=len`.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.entries
            .iter()
            .zip(1_i64..)
            .all(|(entry, expected)| entry.sequence == expected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap()
    }

    #[test]
    fn test_push_back_assigns_increasing_sequences() {
        // Arrange
        let mut ledger = QueueLedger::new(Uuid::new_v4());

        // Act
        let first = ledger.push_back(Uuid::new_v4(), at(0)).unwrap();
        let second = ledger.push_back(Uuid::new_v4(), at(1)).unwrap();

        // Assert
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.is_contiguous());
    }

    #[test]
    fn test_push_back_rejects_duplicate_quest() {
        // Arrange
        let mut ledger = QueueLedger::new(Uuid::new_v4());
        let quest_id = Uuid::new_v4();
        ledger.push_back(quest_id, at(0)).unwrap();

        // Act
        let result = ledger.push_back(quest_id, at(1));

        // Assert
        match result {
            Err(DomainError::Conflict(msg)) => assert!(msg.contains("already assigned")),
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_pop_front_returns_oldest_and_compacts() {
        // Arrange
        let mut ledger = QueueLedger::new(Uuid::new_v4());
        let quests: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for (minute, quest_id) in (0..).zip(&quests) {
            ledger.push_back(*quest_id, at(minute)).unwrap();
        }

        // Act
        let removed = ledger.pop_front().unwrap();

        // Assert
        assert_eq!(removed.quest_id, quests[0]);
        assert_eq!(removed.sequence, 1);
        let remaining: Vec<(Uuid, i64)> = ledger.iter().map(|a| (a.quest_id, a.sequence)).collect();
        assert_eq!(remaining, vec![(quests[1], 1), (quests[2], 2)]);
    }

    #[test]
    fn test_pop_front_on_empty_ledger_returns_none() {
        let mut ledger = QueueLedger::new(Uuid::new_v4());
        assert!(ledger.pop_front().is_none());
        assert!(ledger.front().is_none());
        assert_eq!(ledger.max_sequence(), 0);
    }

    #[test]
    fn test_dequeued_quest_can_be_requeued_at_the_back() {
        // Arrange
        let mut ledger = QueueLedger::new(Uuid::new_v4());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        ledger.push_back(a, at(0)).unwrap();
        ledger.push_back(b, at(1)).unwrap();
        ledger.pop_front();

        // Act
        let requeued = ledger.push_back(a, at(2)).unwrap();

        // Assert
        assert_eq!(requeued.sequence, 2);
        assert_eq!(ledger.front().unwrap().quest_id, b);
    }

    #[test]
    fn test_interleaved_operations_keep_sequences_contiguous() {
        let mut ledger = QueueLedger::new(Uuid::new_v4());
        let mut minute = 0;
        for round in 0..20 {
            // Two pushes then one pop per round, with an extra pop every 3rd.
            for _ in 0..2 {
                ledger.push_back(Uuid::new_v4(), at(minute % 60)).unwrap();
                minute += 1;
            }
            ledger.pop_front();
            if round % 3 == 0 {
                ledger.pop_front();
            }
            assert!(ledger.is_contiguous(), "gap after round {round}");
        }
        assert_eq!(usize::try_from(ledger.max_sequence()).unwrap(), ledger.len());
    }
}
