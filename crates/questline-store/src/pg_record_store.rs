//! `PostgreSQL` implementation of the record store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use questline_core::error::DomainError;
use questline_core::record::{Assignment, Character, CompletedQuest, Quest, QueuedQuest};
use questline_core::repository::{
    AssignmentRepository, CharacterRepository, QuestRepository, RewardRule,
};

const CHARACTER_NAME_CONSTRAINT: &str = "characters_name_unique";
const ASSIGNMENT_PAIR_CONSTRAINT: &str = "quest_assignments_pkey";
const ASSIGNMENT_SEQUENCE_CONSTRAINT: &str = "quest_assignments_sequence_unique";

const QUEUED_QUEST_COLUMNS: &str = r"
    a.character_id, a.quest_id, a.sequence, a.assigned_at,
    q.title, q.description, q.xp_reward, q.difficulty
";

/// PostgreSQL-backed record store.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Creates a new `PgRecordStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CharacterRow {
    id: Uuid,
    name: String,
    class: String,
    level: i32,
    experience: i32,
}

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            class: row.class,
            level: row.level,
            experience: row.experience,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QuestRow {
    id: Uuid,
    title: String,
    description: String,
    xp_reward: i32,
    difficulty: i32,
}

impl From<QuestRow> for Quest {
    fn from(row: QuestRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            xp_reward: row.xp_reward,
            difficulty: row.difficulty,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    character_id: Uuid,
    quest_id: Uuid,
    sequence: i64,
    assigned_at: DateTime<Utc>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            character_id: row.character_id,
            quest_id: row.quest_id,
            sequence: row.sequence,
            assigned_at: row.assigned_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QueuedQuestRow {
    character_id: Uuid,
    quest_id: Uuid,
    sequence: i64,
    assigned_at: DateTime<Utc>,
    title: String,
    description: String,
    xp_reward: i32,
    difficulty: i32,
}

impl From<QueuedQuestRow> for QueuedQuest {
    fn from(row: QueuedQuestRow) -> Self {
        Self {
            assignment: Assignment {
                character_id: row.character_id,
                quest_id: row.quest_id,
                sequence: row.sequence,
                assigned_at: row.assigned_at,
            },
            quest: Quest {
                id: row.quest_id,
                title: row.title,
                description: row.description,
                xp_reward: row.xp_reward,
                difficulty: row.difficulty,
            },
        }
    }
}

fn infrastructure(err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

/// Name of the unique constraint `err` violated, if any.
fn violated_unique_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => db.constraint(),
        _ => None,
    }
}

/// Maps an assignment write failure onto the domain error it represents.
fn assignment_write_error(err: &sqlx::Error, character_id: Uuid, quest_id: Uuid) -> DomainError {
    match violated_unique_constraint(err) {
        Some(ASSIGNMENT_PAIR_CONSTRAINT) => DomainError::Conflict(format!(
            "quest {quest_id} is already assigned to character {character_id}"
        )),
        Some(ASSIGNMENT_SEQUENCE_CONSTRAINT) => DomainError::ConcurrencyConflict { character_id },
        _ => infrastructure(err),
    }
}

/// Takes the per-character row lock that serializes queue mutations and
/// returns the locked character.
async fn lock_character(
    conn: &mut PgConnection,
    character_id: Uuid,
) -> Result<Character, DomainError> {
    let locked: Option<CharacterRow> = sqlx::query_as(
        "SELECT id, name, class, level, experience FROM characters WHERE id = $1 FOR UPDATE",
    )
    .bind(character_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| infrastructure(&e))?;

    locked
        .map(Character::from)
        .ok_or_else(|| DomainError::character_not_found(character_id))
}

/// The lowest-sequence assignment for the character, joined with its quest.
async fn fetch_head(
    conn: &mut PgConnection,
    character_id: Uuid,
) -> Result<Option<QueuedQuest>, DomainError> {
    let head: Option<QueuedQuestRow> = sqlx::query_as(&format!(
        r"
        SELECT {QUEUED_QUEST_COLUMNS}
        FROM quest_assignments a
        JOIN quests q ON q.id = a.quest_id
        WHERE a.character_id = $1
        ORDER BY a.sequence ASC
        LIMIT 1
        "
    ))
    .bind(character_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| infrastructure(&e))?;
    Ok(head.map(QueuedQuest::from))
}

/// Deletes `head` and shifts every later assignment down by one.
async fn remove_head(conn: &mut PgConnection, head: &QueuedQuest) -> Result<(), DomainError> {
    let character_id = head.assignment.character_id;

    sqlx::query("DELETE FROM quest_assignments WHERE character_id = $1 AND quest_id = $2")
        .bind(character_id)
        .bind(head.assignment.quest_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| infrastructure(&e))?;

    sqlx::query(
        r"
        UPDATE quest_assignments
        SET sequence = sequence - 1
        WHERE character_id = $1 AND sequence > $2
        ",
    )
    .bind(character_id)
    .bind(head.assignment.sequence)
    .execute(&mut *conn)
    .await
    .map_err(|e| infrastructure(&e))?;
    Ok(())
}

/// Maps a failed queue commit; the deferred sequence constraint is checked here.
fn queue_commit_error(err: &sqlx::Error, character_id: Uuid) -> DomainError {
    if violated_unique_constraint(err) == Some(ASSIGNMENT_SEQUENCE_CONSTRAINT) {
        DomainError::ConcurrencyConflict { character_id }
    } else {
        infrastructure(err)
    }
}

#[async_trait]
impl CharacterRepository for PgRecordStore {
    #[instrument(skip(self, character), fields(character_id = %character.id))]
    async fn insert_character(&self, character: &Character) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO characters (id, name, class, level, experience) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(character.id)
        .bind(&character.name)
        .bind(&character.class)
        .bind(character.level)
        .bind(character.experience)
        .execute(&self.pool)
        .await
        .map_err(|e| match violated_unique_constraint(&e) {
            Some(CHARACTER_NAME_CONSTRAINT) => DomainError::Conflict(format!(
                "a character named '{}' already exists",
                character.name
            )),
            _ => infrastructure(&e),
        })?;
        Ok(())
    }

    async fn find_character(&self, id: Uuid) -> Result<Option<Character>, DomainError> {
        let row: Option<CharacterRow> = sqlx::query_as(
            "SELECT id, name, class, level, experience FROM characters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(row.map(Character::from))
    }

    async fn list_characters(&self) -> Result<Vec<Character>, DomainError> {
        let rows: Vec<CharacterRow> = sqlx::query_as(
            "SELECT id, name, class, level, experience FROM characters ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(rows.into_iter().map(Character::from).collect())
    }
}

#[async_trait]
impl QuestRepository for PgRecordStore {
    #[instrument(skip(self, quest), fields(quest_id = %quest.id))]
    async fn insert_quest(&self, quest: &Quest) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO quests (id, title, description, xp_reward, difficulty) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(quest.id)
        .bind(&quest.title)
        .bind(&quest.description)
        .bind(quest.xp_reward)
        .bind(quest.difficulty)
        .execute(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(())
    }

    async fn find_quest(&self, id: Uuid) -> Result<Option<Quest>, DomainError> {
        let row: Option<QuestRow> = sqlx::query_as(
            "SELECT id, title, description, xp_reward, difficulty FROM quests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(row.map(Quest::from))
    }

    async fn list_quests(&self) -> Result<Vec<Quest>, DomainError> {
        let rows: Vec<QuestRow> = sqlx::query_as(
            "SELECT id, title, description, xp_reward, difficulty FROM quests ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(rows.into_iter().map(Quest::from).collect())
    }
}

#[async_trait]
impl AssignmentRepository for PgRecordStore {
    #[instrument(skip(self))]
    async fn enqueue_assignment(
        &self,
        character_id: Uuid,
        quest_id: Uuid,
        assigned_at: DateTime<Utc>,
    ) -> Result<Assignment, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| infrastructure(&e))?;

        lock_character(&mut tx, character_id).await?;

        let quest: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM quests WHERE id = $1")
            .bind(quest_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| infrastructure(&e))?;
        if quest.is_none() {
            return Err(DomainError::quest_not_found(quest_id));
        }

        let (max_sequence,): (Option<i64>,) = sqlx::query_as(
            "SELECT MAX(sequence) FROM quest_assignments WHERE character_id = $1",
        )
        .bind(character_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| infrastructure(&e))?;
        let next_sequence = max_sequence.unwrap_or(0) + 1;

        let row: AssignmentRow = sqlx::query_as(
            r"
            INSERT INTO quest_assignments (character_id, quest_id, sequence, assigned_at)
            VALUES ($1, $2, $3, $4)
            RETURNING character_id, quest_id, sequence, assigned_at
            ",
        )
        .bind(character_id)
        .bind(quest_id)
        .bind(next_sequence)
        .bind(assigned_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| assignment_write_error(&e, character_id, quest_id))?;

        tx.commit()
            .await
            .map_err(|e| assignment_write_error(&e, character_id, quest_id))?;

        debug!(sequence = row.sequence, "quest appended to queue");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn dequeue_assignment(
        &self,
        character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| infrastructure(&e))?;

        lock_character(&mut tx, character_id).await?;

        let Some(removed) = fetch_head(&mut tx, character_id).await? else {
            tx.rollback().await.map_err(|e| infrastructure(&e))?;
            return Ok(None);
        };
        remove_head(&mut tx, &removed).await?;

        tx.commit()
            .await
            .map_err(|e| queue_commit_error(&e, character_id))?;

        debug!(quest_id = %removed.quest.id, "quest removed from queue head");
        Ok(Some(removed))
    }

    #[instrument(skip(self, reward))]
    async fn complete_assignment(
        &self,
        character_id: Uuid,
        reward: &RewardRule,
    ) -> Result<Option<CompletedQuest>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| infrastructure(&e))?;

        let character = lock_character(&mut tx, character_id).await?;
        let Some(queued) = fetch_head(&mut tx, character_id).await? else {
            tx.rollback().await.map_err(|e| infrastructure(&e))?;
            return Ok(None);
        };

        let rewarded = match reward(&character, &queued.quest) {
            Ok(rewarded) => rewarded,
            Err(rejected) => {
                tx.rollback().await.map_err(|e| infrastructure(&e))?;
                return Err(rejected);
            }
        };

        remove_head(&mut tx, &queued).await?;

        let row: CharacterRow = sqlx::query_as(
            r"
            UPDATE characters
            SET experience = $2, level = $3
            WHERE id = $1
            RETURNING id, name, class, level, experience
            ",
        )
        .bind(character_id)
        .bind(rewarded.experience)
        .bind(rewarded.level)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| infrastructure(&e))?;

        tx.commit()
            .await
            .map_err(|e| queue_commit_error(&e, character_id))?;

        debug!(quest_id = %queued.quest.id, "quest completed and rewarded");
        Ok(Some(CompletedQuest {
            queued,
            character: row.into(),
        }))
    }

    async fn peek_assignment(
        &self,
        character_id: Uuid,
    ) -> Result<Option<QueuedQuest>, DomainError> {
        let row: Option<QueuedQuestRow> = sqlx::query_as(&format!(
            r"
            SELECT {QUEUED_QUEST_COLUMNS}
            FROM quest_assignments a
            JOIN quests q ON q.id = a.quest_id
            WHERE a.character_id = $1
            ORDER BY a.sequence ASC
            LIMIT 1
            "
        ))
        .bind(character_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(row.map(QueuedQuest::from))
    }

    async fn count_assignments(&self, character_id: Uuid) -> Result<usize, DomainError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM quest_assignments WHERE character_id = $1")
                .bind(character_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;
        usize::try_from(count)
            .map_err(|e| DomainError::Infrastructure(format!("invalid assignment count: {e}")))
    }

    async fn list_assignments(
        &self,
        character_id: Uuid,
    ) -> Result<Vec<QueuedQuest>, DomainError> {
        let rows: Vec<QueuedQuestRow> = sqlx::query_as(&format!(
            r"
            SELECT {QUEUED_QUEST_COLUMNS}
            FROM quest_assignments a
            JOIN quests q ON q.id = a.quest_id
            WHERE a.character_id = $1
            ORDER BY a.sequence ASC
            "
        ))
        .bind(character_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(rows.into_iter().map(QueuedQuest::from).collect())
    }
}
