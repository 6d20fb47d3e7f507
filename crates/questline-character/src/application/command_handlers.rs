//! Command handlers for the character context.
//!
//! These validate a command, apply domain rules, and persist the result
//! through the record store.

use questline_core::error::DomainError;
use questline_core::record::Character;
use questline_core::repository::RecordStore;
use tracing::{info, instrument};

use crate::domain::commands::CreateCharacter;

/// Handles the `CreateCharacter` command: validates the starting fields and
/// persists the new character.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name, a level below 1, or
/// negative experience; `DomainError::Conflict` if the name is taken.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_create_character(
    command: &CreateCharacter,
    store: &dyn RecordStore,
) -> Result<Character, DomainError> {
    let name = command.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "character name must not be empty".into(),
        ));
    }
    if command.level < 1 {
        return Err(DomainError::Validation(
            "character level must be at least 1".into(),
        ));
    }
    if command.experience < 0 {
        return Err(DomainError::Validation(
            "character experience must not be negative".into(),
        ));
    }

    let character = Character {
        id: command.character_id,
        name: name.to_owned(),
        class: command.class.clone(),
        level: command.level,
        experience: command.experience,
    };
    store.insert_character(&character).await?;

    info!(character_id = %character.id, "character created");
    Ok(character)
}

#[cfg(test)]
mod tests {
    use questline_core::error::DomainError;
    use questline_core::repository::CharacterRepository;
    use questline_store::InMemoryRecordStore;
    use uuid::Uuid;

    use crate::application::command_handlers::handle_create_character;
    use crate::domain::commands::CreateCharacter;
    use questline_test_support::FailingRecordStore;

    fn create_command(name: &str) -> CreateCharacter {
        CreateCharacter {
            correlation_id: Uuid::new_v4(),
            character_id: Uuid::now_v7(),
            name: name.to_owned(),
            class: "warrior".to_owned(),
            level: 1,
            experience: 0,
        }
    }

    #[tokio::test]
    async fn test_handle_create_character_persists_character() {
        // Arrange
        let store = InMemoryRecordStore::new();
        let command = create_command("  Aldric ");

        // Act
        let character = handle_create_character(&command, &store).await.unwrap();

        // Assert
        assert_eq!(character.id, command.character_id);
        assert_eq!(character.name, "Aldric");
        assert_eq!(character.level, 1);
        assert_eq!(character.experience, 0);
        let stored = store.find_character(character.id).await.unwrap();
        assert_eq!(stored, Some(character));
    }

    #[tokio::test]
    async fn test_handle_create_character_rejects_empty_name() {
        // Arrange
        let store = InMemoryRecordStore::new();
        let command = create_command("  ");

        // Act
        let result = handle_create_character(&command, &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => {
                assert_eq!(msg, "character name must not be empty");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_create_character_rejects_out_of_range_fields() {
        let store = InMemoryRecordStore::new();

        let mut zero_level = create_command("Aldric");
        zero_level.level = 0;
        let mut negative_xp = create_command("Brynna");
        negative_xp.experience = -5;

        assert!(matches!(
            handle_create_character(&zero_level, &store).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            handle_create_character(&negative_xp, &store).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_handle_create_character_rejects_duplicate_name() {
        // Arrange
        let store = InMemoryRecordStore::new();
        handle_create_character(&create_command("Aldric"), &store)
            .await
            .unwrap();

        // Act
        let result = handle_create_character(&create_command("Aldric"), &store).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_handle_create_character_propagates_infrastructure_errors() {
        let result = handle_create_character(&create_command("Aldric"), &FailingRecordStore).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
