//! Handlers for the raw wellbeing signals a member records about themself.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use moodwell_core::progress::validate_module_name;
use moodwell_core::signals::{validate_mood, validate_session_duration};
use moodwell_db::models::mood_entry::CreateMoodEntry;
use moodwell_db::models::module_session::CreateModuleSession;
use moodwell_db::repositories::{ModuleSessionRepo, MoodEntryRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Mood entries
// ---------------------------------------------------------------------------

/// POST /api/v1/mood-entries
pub async fn create_mood_entry(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateMoodEntry>,
) -> AppResult<impl IntoResponse> {
    validate_mood(input.valence, input.arousal, input.note.as_deref())?;
    let entry = MoodEntryRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::debug!(user_id = user.user_id, entry_id = entry.id, "Mood entry recorded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/v1/mood-entries?limit=
///
/// The caller's most recent entries, newest first.
pub async fn list_mood_entries(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let entries = MoodEntryRepo::list_recent(&state.pool, user.user_id, params.clamped()).await?;
    Ok(Json(DataResponse { data: entries }))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions
pub async fn create_session(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateModuleSession>,
) -> AppResult<impl IntoResponse> {
    validate_module_name(&input.module_name)?;
    validate_session_duration(input.duration_secs)?;
    let session = ModuleSessionRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::debug!(
        user_id = user.user_id,
        module_name = %session.module_name,
        duration_secs = session.duration_secs,
        "Module session recorded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}
