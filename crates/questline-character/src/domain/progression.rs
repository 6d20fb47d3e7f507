//! The experience and level-up rule.

use questline_core::error::DomainError;
use questline_core::record::{Character, Quest};

/// Experience needed per level.
pub const XP_PER_LEVEL: i32 = 100;

/// Level implied by a total experience: `floor(experience / 100) + 1`.
#[must_use]
pub fn level_for_experience(experience: i32) -> i32 {
    experience / XP_PER_LEVEL + 1
}

/// Result of applying an experience reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    /// Experience after the reward.
    pub experience: i32,
    /// Level after the reward. Never lower than before.
    pub level: i32,
    /// Whether the reward raised the level.
    pub leveled_up: bool,
}

/// Applies `reward` experience to `character`.
///
/// The level only ever moves up: a character whose stored level is already
/// above what the curve implies keeps it.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the reward is negative or the total
/// would overflow.
pub fn apply_reward(character: &Character, reward: i32) -> Result<Progression, DomainError> {
    if reward < 0 {
        return Err(DomainError::Validation(
            "experience reward must not be negative".into(),
        ));
    }

    let experience = character.experience.checked_add(reward).ok_or_else(|| {
        DomainError::Validation(format!(
            "experience for character {} would overflow",
            character.id
        ))
    })?;
    let level = character.level.max(level_for_experience(experience));

    Ok(Progression {
        experience,
        level,
        leveled_up: level > character.level,
    })
}

/// The character record after completing `quest`, with its reward applied.
///
/// Usable as a record store `RewardRule`.
///
/// # Errors
///
/// Same as [`apply_reward`].
pub fn reward_for_quest(character: &Character, quest: &Quest) -> Result<Character, DomainError> {
    let outcome = apply_reward(character, quest.xp_reward)?;
    Ok(Character {
        experience: outcome.experience,
        level: outcome.level,
        ..character.clone()
    })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn character(level: i32, experience: i32) -> Character {
        Character {
            id: Uuid::new_v4(),
            name: "Aldric".to_owned(),
            class: "warrior".to_owned(),
            level,
            experience,
        }
    }

    #[test]
    fn test_level_for_experience_follows_hundred_xp_steps() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(99), 1);
        assert_eq!(level_for_experience(100), 2);
        assert_eq!(level_for_experience(130), 2);
        assert_eq!(level_for_experience(250), 3);
    }

    #[test]
    fn test_apply_reward_below_threshold_keeps_level() {
        let progression = apply_reward(&character(1, 0), 50).unwrap();

        assert_eq!(
            progression,
            Progression {
                experience: 50,
                level: 1,
                leveled_up: false,
            }
        );
    }

    #[test]
    fn test_apply_reward_crossing_threshold_levels_up() {
        let progression = apply_reward(&character(1, 50), 80).unwrap();

        assert_eq!(progression.experience, 130);
        assert_eq!(progression.level, 2);
        assert!(progression.leveled_up);
    }

    #[test]
    fn test_apply_reward_never_lowers_level() {
        // A character created at level 5 with no experience.
        let progression = apply_reward(&character(5, 0), 120).unwrap();

        assert_eq!(progression.experience, 120);
        assert_eq!(progression.level, 5);
        assert!(!progression.leveled_up);
    }

    #[test]
    fn test_apply_zero_reward_is_a_no_op() {
        let progression = apply_reward(&character(2, 140), 0).unwrap();

        assert_eq!(progression.experience, 140);
        assert_eq!(progression.level, 2);
        assert!(!progression.leveled_up);
    }

    #[test]
    fn test_apply_reward_rejects_negative_and_overflow() {
        assert!(matches!(
            apply_reward(&character(1, 0), -1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            apply_reward(&character(1, i32::MAX - 1), 2),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_reward_for_quest_updates_only_progression_fields() {
        let before = character(1, 50);
        let quest = Quest {
            id: Uuid::new_v4(),
            title: "Find Sword".to_owned(),
            description: String::new(),
            xp_reward: 80,
            difficulty: 2,
        };

        let after = reward_for_quest(&before, &quest).unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
        assert_eq!((after.experience, after.level), (130, 2));
    }
}
