//! Route definitions for mood entries and module sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::signals;
use crate::state::AppState;

/// Routes mounted at `/mood-entries`.
///
/// ```text
/// GET    /    -> list_mood_entries (?limit)
/// POST   /    -> create_mood_entry
/// ```
pub fn mood_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(signals::list_mood_entries).post(signals::create_mood_entry),
    )
}

/// Routes mounted at `/sessions`.
///
/// ```text
/// POST   /    -> create_session
/// ```
pub fn session_router() -> Router<AppState> {
    Router::new().route("/", post(signals::create_session))
}
