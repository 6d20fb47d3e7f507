//! Persisted records: characters, quests, and queue assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique, non-empty display name.
    pub name: String,
    /// Free-text class tag ("warrior", "mage", ...).
    pub class: String,
    /// Current level, always at least 1.
    pub level: i32,
    /// Accumulated experience, never negative.
    pub experience: i32,
}

/// A quest in the catalog. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Unique identifier.
    pub id: Uuid,
    /// Quest title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Experience granted on completion.
    pub xp_reward: i32,
    /// Difficulty rating.
    pub difficulty: i32,
}

/// A quest accepted by a character, occupying position `sequence` in that
/// character's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The owning character.
    pub character_id: Uuid,
    /// The accepted quest.
    pub quest_id: Uuid,
    /// 1-based queue position; lower means accepted earlier.
    pub sequence: i64,
    /// When the quest was accepted.
    pub assigned_at: DateTime<Utc>,
}

/// An assignment joined with the quest it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedQuest {
    /// The queue entry.
    pub assignment: Assignment,
    /// The quest occupying that entry.
    pub quest: Quest,
}

/// A queue head that was removed together with the reward it earned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedQuest {
    /// The removed queue entry and its quest.
    pub queued: QueuedQuest,
    /// The character after the reward was written.
    pub character: Character,
}
