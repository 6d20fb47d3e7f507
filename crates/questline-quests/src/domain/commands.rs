//! Commands for the quest context.

use uuid::Uuid;

/// Command to add a quest to the catalog.
#[derive(Debug, Clone)]
pub struct CreateQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The identifier to assign to the new quest.
    pub quest_id: Uuid,
    /// Quest title. Must not be blank.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Experience granted on completion. Must not be negative.
    pub xp_reward: i32,
    /// Difficulty rating.
    pub difficulty: i32,
}

/// Command for a character to accept a quest into its queue.
#[derive(Debug, Clone)]
pub struct AcceptQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The accepting character.
    pub character_id: Uuid,
    /// The quest being accepted.
    pub quest_id: Uuid,
}

/// Command for a character to complete the oldest quest in its queue.
#[derive(Debug, Clone)]
pub struct CompleteQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The completing character.
    pub character_id: Uuid,
}
