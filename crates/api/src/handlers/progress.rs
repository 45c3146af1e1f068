//! Handlers for per-module user progress.
//!
//! All endpoints require authentication via [`RequireAuth`] and operate on
//! the caller's own rows only.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use moodwell_core::progress::{validate_module_name, ModuleProgress, ProgressUpdate};
use moodwell_db::repositories::ModuleProgressRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/progress
///
/// List every module the caller has progress in, ordered by module name.
pub async fn list_progress(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = ModuleProgressRepo::list_by_user(&state.pool, user.user_id).await?;
    let data: Vec<ModuleProgress> = rows.into_iter().map(|r| r.into_progress()).collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/progress/{module}
///
/// Load the caller's progress for a module, creating a level-1 row on first access.
pub async fn get_progress(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(module_name): Path<String>,
) -> AppResult<impl IntoResponse> {
    validate_module_name(&module_name)?;
    let row = ModuleProgressRepo::find_or_create(&state.pool, user.user_id, &module_name).await?;

    Ok(Json(DataResponse {
        data: row.into_progress(),
    }))
}

/// PUT /api/v1/progress/{module}
///
/// Merge a coalesced update into the stored row and return the result.
/// XP never decreases, unlocked items are unioned, and metadata keys are
/// merged with the incoming value winning per key.
pub async fn save_progress(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(module_name): Path<String>,
    Json(update): Json<ProgressUpdate>,
) -> AppResult<impl IntoResponse> {
    validate_module_name(&module_name)?;
    update.validate()?;

    let row =
        ModuleProgressRepo::apply_update(&state.pool, user.user_id, &module_name, &update).await?;
    let progress = row.into_progress();

    tracing::info!(
        user_id = user.user_id,
        module_name = %module_name,
        total_xp = progress.total_xp,
        level = progress.level,
        "Module progress saved",
    );

    Ok(Json(DataResponse { data: progress }))
}
