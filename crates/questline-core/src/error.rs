//! Domain error types.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// The kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A character record.
    Character,
    /// A quest record.
    Quest,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => f.write_str("character"),
            Self::Quest => f.write_str("quest"),
        }
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced character or quest does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What kind of record was looked up.
        entity: EntityKind,
        /// The identifier that was not found.
        id: Uuid,
    },

    /// The operation would violate a uniqueness rule (duplicate character
    /// name, quest already assigned to the character).
    #[error("{0}")]
    Conflict(String),

    /// The character's quest queue has nothing to dequeue.
    #[error("character {0} has no pending quests")]
    EmptyQueue(Uuid),

    /// Two writers raced on the same character's queue ordering.
    ///
    /// Raised by storage when a sequence number was claimed concurrently;
    /// the quest queue retries these before surfacing a `Conflict`.
    #[error("concurrent modification of the quest queue for character {character_id}")]
    ConcurrencyConflict {
        /// The character whose queue was contended.
        character_id: Uuid,
    },

    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a missing character.
    #[must_use]
    pub fn character_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: EntityKind::Character,
            id,
        }
    }

    /// Shorthand for a missing quest.
    #[must_use]
    pub fn quest_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: EntityKind::Quest,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_entity() {
        let id = Uuid::nil();
        assert_eq!(
            DomainError::quest_not_found(id).to_string(),
            format!("quest not found: {id}")
        );
        assert_eq!(
            DomainError::character_not_found(id).to_string(),
            format!("character not found: {id}")
        );
    }

    #[test]
    fn test_empty_queue_message() {
        let id = Uuid::nil();
        assert_eq!(
            DomainError::EmptyQueue(id).to_string(),
            format!("character {id} has no pending quests")
        );
    }
}
