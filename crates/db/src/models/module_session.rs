//! Module session models and DTOs.

use moodwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `module_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModuleSession {
    pub id: DbId,
    pub user_id: DbId,
    pub module_name: String,
    pub duration_secs: i32,
    pub started_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for recording a completed session. `started_at` defaults to now.
#[derive(Debug, Deserialize)]
pub struct CreateModuleSession {
    pub module_name: String,
    pub duration_secs: i32,
    pub started_at: Option<Timestamp>,
}
