//! Admin-only handlers: badge awards and team membership.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use moodwell_core::error::CoreError;
use moodwell_core::signals::validate_badge_code;
use moodwell_db::models::badge::CreateBadgeAward;
use moodwell_db::models::team::CreateTeamMember;
use moodwell_db::repositories::{BadgeAwardRepo, TeamRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/badges
pub async fn award_badge(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateBadgeAward>,
) -> AppResult<impl IntoResponse> {
    validate_badge_code(&input.badge_code)?;
    let award = BadgeAwardRepo::create(&state.pool, &input).await?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = award.user_id,
        badge_code = %award.badge_code,
        "Badge awarded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: award })))
}

/// POST /api/v1/admin/teams/members
///
/// Returns 409 when the user is already on the team.
pub async fn add_team_member(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTeamMember>,
) -> AppResult<impl IntoResponse> {
    if input.team_name.trim().is_empty() {
        return Err(CoreError::Validation("team_name must not be empty".into()).into());
    }
    let member = TeamRepo::add_member(&state.pool, &input).await?;

    tracing::info!(
        admin_id = admin.user_id,
        org_id = member.org_id,
        team_name = %member.team_name,
        user_id = member.user_id,
        "Team member added",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}
