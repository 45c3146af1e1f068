//! Repository for the `mood_entries` table.

use moodwell_core::types::DbId;
use sqlx::PgPool;

use crate::models::mood_entry::{CreateMoodEntry, MoodEntry};

/// Column list for `mood_entries` queries.
const COLUMNS: &str = "id, user_id, valence, arousal, note, recorded_at, created_at";

pub struct MoodEntryRepo;

impl MoodEntryRepo {
    /// Insert a mood entry for a user.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateMoodEntry,
    ) -> Result<MoodEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO mood_entries (user_id, valence, arousal, note, recorded_at) \
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MoodEntry>(&query)
            .bind(user_id)
            .bind(input.valence)
            .bind(input.arousal)
            .bind(input.note.as_deref())
            .bind(input.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Most recent entries for a user, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<MoodEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mood_entries \
             WHERE user_id = $1 \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, MoodEntry>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
