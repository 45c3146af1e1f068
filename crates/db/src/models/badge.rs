//! Badge award models and DTOs.

use moodwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `badge_awards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BadgeAward {
    pub id: DbId,
    pub user_id: DbId,
    pub badge_code: String,
    pub awarded_at: Timestamp,
}

/// DTO for awarding a badge to a user.
#[derive(Debug, Deserialize)]
pub struct CreateBadgeAward {
    pub user_id: DbId,
    pub badge_code: String,
    pub awarded_at: Option<Timestamp>,
}
