//! Repository for the `team_members` table and team-scoped signal loading.

use moodwell_core::team_signals::{BadgeSample, MoodSample, SessionSample, TeamSignals};
use moodwell_core::types::{DbId, Period};
use sqlx::PgPool;

use crate::models::team::{CreateTeamMember, TeamMember};

/// Column list for `team_members` queries.
const COLUMNS: &str = "id, org_id, team_name, user_id, created_at";

pub struct TeamRepo;

impl TeamRepo {
    /// Add a user to a team. Duplicates violate `uq_team_members_org_team_user`.
    pub async fn add_member(
        pool: &PgPool,
        input: &CreateTeamMember,
    ) -> Result<TeamMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_members (org_id, team_name, user_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(input.org_id)
            .bind(&input.team_name)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Number of members on a team.
    pub async fn count_members(
        pool: &PgPool,
        org_id: DbId,
        team_name: &str,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_members WHERE org_id = $1 AND team_name = $2",
        )
        .bind(org_id)
        .bind(team_name)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Load every mood entry, session and badge award recorded by the team's
    /// members inside the half-open `period`.
    pub async fn load_signals(
        pool: &PgPool,
        org_id: DbId,
        team_name: &str,
        period: Period,
    ) -> Result<TeamSignals, sqlx::Error> {
        let member_count = Self::count_members(pool, org_id, team_name).await?;

        let moods: Vec<(DbId, f64, f64)> = sqlx::query_as(
            "SELECT m.user_id, m.valence, m.arousal \
             FROM mood_entries m \
             JOIN team_members t ON t.user_id = m.user_id \
             WHERE t.org_id = $1 AND t.team_name = $2 \
               AND m.recorded_at >= $3 AND m.recorded_at < $4",
        )
        .bind(org_id)
        .bind(team_name)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(pool)
        .await?;

        let sessions: Vec<(DbId, i32)> = sqlx::query_as(
            "SELECT s.user_id, s.duration_secs \
             FROM module_sessions s \
             JOIN team_members t ON t.user_id = s.user_id \
             WHERE t.org_id = $1 AND t.team_name = $2 \
               AND s.started_at >= $3 AND s.started_at < $4",
        )
        .bind(org_id)
        .bind(team_name)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(pool)
        .await?;

        let badges: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT b.user_id, b.badge_code \
             FROM badge_awards b \
             JOIN team_members t ON t.user_id = b.user_id \
             WHERE t.org_id = $1 AND t.team_name = $2 \
               AND b.awarded_at >= $3 AND b.awarded_at < $4",
        )
        .bind(org_id)
        .bind(team_name)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(pool)
        .await?;

        Ok(TeamSignals {
            member_count: usize::try_from(member_count).unwrap_or(0),
            moods: moods
                .into_iter()
                .map(|(user_id, valence, arousal)| MoodSample {
                    user_id,
                    valence,
                    arousal,
                })
                .collect(),
            sessions: sessions
                .into_iter()
                .map(|(user_id, duration_secs)| SessionSample {
                    user_id,
                    duration_secs,
                })
                .collect(),
            badges: badges
                .into_iter()
                .map(|(user_id, badge_code)| BadgeSample {
                    user_id,
                    badge_code,
                })
                .collect(),
        })
    }
}
