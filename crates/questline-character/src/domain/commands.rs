//! Commands for the character context.

use uuid::Uuid;

/// Default level for a newly created character.
pub const DEFAULT_LEVEL: i32 = 1;

/// Default experience for a newly created character.
pub const DEFAULT_EXPERIENCE: i32 = 0;

/// Command to create a new character.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The identifier to assign to the new character.
    pub character_id: Uuid,
    /// The character's name. Must be unique and non-blank.
    pub name: String,
    /// Free-text class tag.
    pub class: String,
    /// Starting level.
    pub level: i32,
    /// Starting experience.
    pub experience: i32,
}
