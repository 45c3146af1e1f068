//! Route definitions for per-module user progress.

use axum::routing::get;
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/progress`.
///
/// ```text
/// GET    /            -> list_progress
/// GET    /{module}    -> get_progress
/// PUT    /{module}    -> save_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(progress::list_progress))
        .route(
            "/{module}",
            get(progress::get_progress).put(progress::save_progress),
        )
}
