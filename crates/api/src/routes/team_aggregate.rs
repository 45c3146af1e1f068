//! Route definitions for team aggregates. Manager or admin only.

use axum::routing::get;
use axum::Router;

use crate::handlers::team_aggregate;
use crate::state::AppState;

/// Routes mounted at `/team-aggregates`.
///
/// ```text
/// GET    /    -> get_aggregate (?org_id, team_name, period_start, period_end)
/// POST   /    -> compute_aggregate
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(team_aggregate::get_aggregate).post(team_aggregate::compute_aggregate),
    )
}
