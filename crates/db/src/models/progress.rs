//! Module progress rows.

use moodwell_core::progress::ModuleProgress;
use moodwell_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `module_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModuleProgressRow {
    pub id: DbId,
    pub user_id: DbId,
    pub module_name: String,
    pub user_level: i32,
    pub total_xp: i64,
    pub unlocked_items: Vec<String>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ModuleProgressRow {
    /// Convert to the domain type. The level is recomputed from `total_xp`
    /// rather than trusted from `user_level`.
    pub fn into_progress(self) -> ModuleProgress {
        let metadata = match self.metadata {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        ModuleProgress {
            module_name: self.module_name,
            level: self.user_level,
            total_xp: self.total_xp,
            unlocked_items: self.unlocked_items.into_iter().collect(),
            metadata,
        }
        .normalized()
    }
}
