use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by the `RequireAdmin`
/// extractor in each handler).
///
/// ```text
/// POST   /badges          -> award_badge
/// POST   /teams/members   -> add_team_member
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/badges", post(admin::award_badge))
        .route("/teams/members", post(admin::add_team_member))
}
