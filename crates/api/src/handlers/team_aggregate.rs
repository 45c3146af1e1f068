//! Handlers for manager-facing team aggregates.
//!
//! Managers only see the anonymized output of
//! [`aggregate`](moodwell_core::team_signals::aggregate); raw signals never
//! leave the database through these endpoints.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use moodwell_core::error::CoreError;
use moodwell_core::team_signals::{aggregate, TeamAggregate};
use moodwell_core::types::{DbId, Timestamp};
use moodwell_db::models::team::{TeamAggregateKey, TeamAggregateRow};
use moodwell_db::repositories::{TeamAggregateRepo, TeamRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// A persisted aggregate together with the key it was computed for.
#[derive(Debug, Serialize)]
pub struct TeamAggregateResponse {
    pub org_id: DbId,
    pub team_name: String,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    #[serde(flatten)]
    pub aggregate: TeamAggregate,
    pub computed_at: Timestamp,
}

impl From<TeamAggregateRow> for TeamAggregateResponse {
    fn from(row: TeamAggregateRow) -> Self {
        Self {
            org_id: row.org_id,
            team_name: row.team_name.clone(),
            period_start: row.period_start,
            period_end: row.period_end,
            computed_at: row.computed_at,
            aggregate: row.into_aggregate(),
        }
    }
}

/// POST /api/v1/team-aggregates
///
/// Compute the aggregate for `(org, team, period)` from the raw signals and
/// persist it, replacing any earlier result for the same key. Suppressed
/// results are stored too so the dashboard can show "not enough responses".
pub async fn compute_aggregate(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(key): Json<TeamAggregateKey>,
) -> AppResult<impl IntoResponse> {
    user.ensure_org(key.org_id)?;
    let period = key.period()?;

    let signals = TeamRepo::load_signals(&state.pool, key.org_id, &key.team_name, period).await?;
    let result = aggregate(&signals);
    let row = TeamAggregateRepo::upsert(&state.pool, &key, &result).await?;

    tracing::info!(
        user_id = user.user_id,
        org_id = key.org_id,
        team_name = %key.team_name,
        can_show = result.can_show,
        response_count = result.response_count,
        "Team aggregate computed",
    );

    Ok(Json(DataResponse {
        data: TeamAggregateResponse::from(row),
    }))
}

/// GET /api/v1/team-aggregates?org_id=&team_name=&period_start=&period_end=
pub async fn get_aggregate(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Query(key): Query<TeamAggregateKey>,
) -> AppResult<impl IntoResponse> {
    user.ensure_org(key.org_id)?;
    key.period()?;

    let row = TeamAggregateRepo::find(&state.pool, &key)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "TeamAggregate",
            key: format!("{}/{}", key.org_id, key.team_name),
        })?;

    Ok(Json(DataResponse {
        data: TeamAggregateResponse::from(row),
    }))
}
