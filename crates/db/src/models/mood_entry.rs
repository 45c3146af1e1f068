//! Mood entry models and DTOs.

use moodwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `mood_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MoodEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub valence: f64,
    pub arousal: f64,
    pub note: Option<String>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for recording a mood entry. `recorded_at` defaults to now.
#[derive(Debug, Deserialize)]
pub struct CreateMoodEntry {
    pub valence: f64,
    pub arousal: f64,
    pub note: Option<String>,
    pub recorded_at: Option<Timestamp>,
}
