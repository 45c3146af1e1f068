//! Repository for the `module_sessions` table.

use moodwell_core::types::DbId;
use sqlx::PgPool;

use crate::models::module_session::{CreateModuleSession, ModuleSession};

/// Column list for `module_sessions` queries.
const COLUMNS: &str = "id, user_id, module_name, duration_secs, started_at, created_at";

pub struct ModuleSessionRepo;

impl ModuleSessionRepo {
    /// Record a completed session.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateModuleSession,
    ) -> Result<ModuleSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO module_sessions (user_id, module_name, duration_secs, started_at) \
             VALUES ($1, $2, $3, COALESCE($4, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModuleSession>(&query)
            .bind(user_id)
            .bind(&input.module_name)
            .bind(input.duration_secs)
            .bind(input.started_at)
            .fetch_one(pool)
            .await
    }
}
