//! Repository for the `team_aggregates` table.

use moodwell_core::team_signals::TeamAggregate;
use sqlx::PgPool;

use crate::models::team::{TeamAggregateKey, TeamAggregateRow};

/// Column list for `team_aggregates` queries.
const COLUMNS: &str = "id, org_id, team_name, period_start, period_end, can_show, phrases, \
                       hints, color_mood, response_count, computed_at";

pub struct TeamAggregateRepo;

impl TeamAggregateRepo {
    /// Upsert the aggregate for `(org, team, period)`. A recomputation
    /// replaces the previous result.
    pub async fn upsert(
        pool: &PgPool,
        key: &TeamAggregateKey,
        aggregate: &TeamAggregate,
    ) -> Result<TeamAggregateRow, sqlx::Error> {
        let hints = aggregate
            .hints
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let query = format!(
            "INSERT INTO team_aggregates \
                 (org_id, team_name, period_start, period_end, can_show, phrases, hints, \
                  color_mood, response_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (org_id, team_name, period_start, period_end) DO UPDATE SET \
                 can_show = EXCLUDED.can_show, \
                 phrases = EXCLUDED.phrases, \
                 hints = EXCLUDED.hints, \
                 color_mood = EXCLUDED.color_mood, \
                 response_count = EXCLUDED.response_count, \
                 computed_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamAggregateRow>(&query)
            .bind(key.org_id)
            .bind(&key.team_name)
            .bind(key.period_start)
            .bind(key.period_end)
            .bind(aggregate.can_show)
            .bind(aggregate.phrases.as_deref())
            .bind(hints)
            .bind(aggregate.color_mood.as_deref())
            .bind(aggregate.response_count)
            .fetch_one(pool)
            .await
    }

    /// Find a previously computed aggregate.
    pub async fn find(
        pool: &PgPool,
        key: &TeamAggregateKey,
    ) -> Result<Option<TeamAggregateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_aggregates \
             WHERE org_id = $1 AND team_name = $2 AND period_start = $3 AND period_end = $4"
        );
        sqlx::query_as::<_, TeamAggregateRow>(&query)
            .bind(key.org_id)
            .bind(&key.team_name)
            .bind(key.period_start)
            .bind(key.period_end)
            .fetch_optional(pool)
            .await
    }
}
