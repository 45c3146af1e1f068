//! Repository for the `module_progress` table.

use moodwell_core::progress::{ProgressUpdate, MAX_METADATA_KEYS, MAX_TOTAL_XP, XP_PER_LEVEL};
use moodwell_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::ModuleProgressRow;

/// Column list for `module_progress` queries.
const COLUMNS: &str = "id, user_id, module_name, user_level, total_xp, unlocked_items, \
                       metadata, created_at, updated_at";

/// One row per `(user_id, module_name)`, created lazily and merged on write.
pub struct ModuleProgressRepo;

impl ModuleProgressRepo {
    /// Find a user's progress in one module.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        module_name: &str,
    ) -> Result<Option<ModuleProgressRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM module_progress WHERE user_id = $1 AND module_name = $2"
        );
        sqlx::query_as::<_, ModuleProgressRow>(&query)
            .bind(user_id)
            .bind(module_name)
            .fetch_optional(pool)
            .await
    }

    /// List all module progress for a user, ordered by module name.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ModuleProgressRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM module_progress WHERE user_id = $1 ORDER BY module_name"
        );
        sqlx::query_as::<_, ModuleProgressRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Return the existing row or create a fresh level-1 row.
    ///
    /// Two concurrent first reads both end up with the same row: the losing
    /// insert is a no-op and falls back to a select.
    pub async fn find_or_create(
        pool: &PgPool,
        user_id: DbId,
        module_name: &str,
    ) -> Result<ModuleProgressRow, sqlx::Error> {
        if let Some(row) = Self::find(pool, user_id, module_name).await? {
            return Ok(row);
        }

        let query = format!(
            "INSERT INTO module_progress (user_id, module_name) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id, module_name) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ModuleProgressRow>(&query)
            .bind(user_id)
            .bind(module_name)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(row) => {
                tracing::debug!(user_id, module_name, "Created module progress row");
                Ok(row)
            }
            None => Self::find(pool, user_id, module_name)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Merge a coalesced update into the stored row in a single statement.
    ///
    /// - `total_xp = LEAST(GREATEST(stored + xp_delta, sent total_xp), MAX_TOTAL_XP)`
    /// - `user_level` recomputed from the new `total_xp`
    /// - `unlocked_items` becomes the sorted, de-duplicated union
    /// - `metadata` is merged per key (`||`), sent keys win; when the merged
    ///   map would exceed `MAX_METADATA_KEYS`, only keys already stored are
    ///   updated
    pub async fn apply_update(
        pool: &PgPool,
        user_id: DbId,
        module_name: &str,
        update: &ProgressUpdate,
    ) -> Result<ModuleProgressRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO module_progress \
                 (user_id, module_name, total_xp, user_level, unlocked_items, metadata) \
             VALUES ( \
                 $1, $2, \
                 GREATEST($3::BIGINT, COALESCE($4::BIGINT, 0)), \
                 (GREATEST($3::BIGINT, COALESCE($4::BIGINT, 0)) / $7 + 1)::INTEGER, \
                 ARRAY(SELECT DISTINCT i FROM unnest(COALESCE($5::TEXT[], '{{}}')) AS i ORDER BY i), \
                 COALESCE($6::JSONB, '{{}}'::JSONB) \
             ) \
             ON CONFLICT (user_id, module_name) DO UPDATE SET \
                 total_xp = LEAST(GREATEST(module_progress.total_xp + $3, COALESCE($4, 0)), $8), \
                 user_level = (LEAST(GREATEST(module_progress.total_xp + $3, COALESCE($4, 0)), $8) \
                               / $7 + 1)::INTEGER, \
                 unlocked_items = ARRAY( \
                     SELECT DISTINCT i \
                     FROM unnest(module_progress.unlocked_items || COALESCE($5::TEXT[], '{{}}')) AS i \
                     ORDER BY i \
                 ), \
                 metadata = CASE \
                     WHEN (SELECT COUNT(*) FROM jsonb_object_keys( \
                               module_progress.metadata || COALESCE($6::JSONB, '{{}}'::JSONB))) <= $9 \
                         THEN module_progress.metadata || COALESCE($6::JSONB, '{{}}'::JSONB) \
                     ELSE module_progress.metadata || COALESCE( \
                         (SELECT jsonb_object_agg(e.key, e.value) \
                          FROM jsonb_each(COALESCE($6::JSONB, '{{}}'::JSONB)) AS e \
                          WHERE module_progress.metadata ? e.key), \
                         '{{}}'::JSONB) \
                 END, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModuleProgressRow>(&query)
            .bind(user_id)
            .bind(module_name)
            .bind(update.xp_delta.clamp(0, MAX_TOTAL_XP))
            .bind(update.total_xp.map(|t| t.clamp(0, MAX_TOTAL_XP)))
            .bind(update.unlocked_items.as_deref())
            .bind(
                update
                    .metadata
                    .as_ref()
                    .map(|m| serde_json::Value::Object(m.clone())),
            )
            .bind(XP_PER_LEVEL)
            .bind(MAX_TOTAL_XP)
            .bind(MAX_METADATA_KEYS as i64)
            .fetch_one(pool)
            .await
    }
}
