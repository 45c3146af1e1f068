mod common;

use axum::http::StatusCode;
use common::{build_test_app, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_ok_with_database(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, json) = get(app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, _) = get(app, "/api/v1/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
