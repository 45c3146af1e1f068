//! Team membership and team aggregate models and DTOs.

use moodwell_core::team_signals::{AggregateHints, TeamAggregate};
use moodwell_core::types::{DbId, Period, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `team_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMember {
    pub id: DbId,
    pub org_id: DbId,
    pub team_name: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for adding a user to a team.
#[derive(Debug, Deserialize)]
pub struct CreateTeamMember {
    pub org_id: DbId,
    pub team_name: String,
    pub user_id: DbId,
}

/// Identifies one aggregate: `(org, team, period)`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeamAggregateKey {
    pub org_id: DbId,
    pub team_name: String,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

impl TeamAggregateKey {
    /// Validated reporting period for this key.
    pub fn period(&self) -> Result<Period, moodwell_core::error::CoreError> {
        Period::new(self.period_start, self.period_end)
    }
}

/// A row from the `team_aggregates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamAggregateRow {
    pub id: DbId,
    pub org_id: DbId,
    pub team_name: String,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub can_show: bool,
    pub phrases: Option<Vec<String>>,
    pub hints: Option<serde_json::Value>,
    pub color_mood: Option<String>,
    pub response_count: i32,
    pub computed_at: Timestamp,
}

impl TeamAggregateRow {
    /// Rebuild the aggregator output from the stored row.
    ///
    /// Hints that no longer deserialize are dropped rather than failing the read.
    pub fn into_aggregate(self) -> TeamAggregate {
        let hints = self
            .hints
            .and_then(|v| serde_json::from_value::<AggregateHints>(v).ok());
        TeamAggregate {
            can_show: self.can_show,
            phrases: self.phrases,
            hints,
            color_mood: self.color_mood,
            response_count: self.response_count,
        }
    }
}
