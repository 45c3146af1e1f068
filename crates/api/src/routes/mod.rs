pub mod admin;
pub mod health;
pub mod progress;
pub mod signals;
pub mod team_aggregate;

use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /progress                     list caller's module progress (GET)
/// /progress/{module}            load or create (GET), merge update (PUT)
///
/// /mood-entries                 list recent (GET), record (POST)
/// /sessions                     record a module session (POST)
///
/// /team-aggregates              fetch by key (GET), compute + persist (POST)
///
/// /admin/badges                 award badge (POST)
/// /admin/teams/members          add team member (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Gamified module progress, written by the progress synchronizer.
        .nest("/progress", progress::router())
        // Raw wellbeing signals.
        .nest("/mood-entries", signals::mood_router())
        .nest("/sessions", signals::session_router())
        // Manager-facing anonymized aggregates.
        .nest("/team-aggregates", team_aggregate::router())
        // Admin routes (badges, team membership).
        .nest("/admin", admin::router())
}

/// Assemble the full application: health at root, API under `/api/v1`, and
/// the shared middleware stack. CORS is added by the binary.
pub fn app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Health check at root level (not under /api/v1).
        .merge(health::router())
        .nest("/api/v1", api_routes())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}
