mod common;

use axum::http::StatusCode;
use chrono::{Duration, SecondsFormat, Utc};
use common::{build_test_app, get, post_json, token_for};
use moodwell_core::roles::{ROLE_ADMIN, ROLE_MANAGER, ROLE_MEMBER};
use moodwell_core::team_signals::{COLOR_ENERGIZED, PHRASE_ENERGY_HIGH, PHRASE_MOOD_POSITIVE};
use serde_json::json;
use sqlx::PgPool;

const ORG: i64 = 3;
const TEAM: &str = "platform";

fn period() -> (String, String) {
    let now = Utc::now();
    (
        (now - Duration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true),
        (now + Duration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Put `n` users on the team, each recording one positive, energized mood.
async fn seed_team(pool: &PgPool, n: i64) {
    let admin = token_for(1000, ROLE_ADMIN, None);
    for user_id in 1..=n {
        let (status, _) = post_json(
            build_test_app(pool.clone()),
            "/api/v1/admin/teams/members",
            Some(&admin),
            json!({ "org_id": ORG, "team_name": TEAM, "user_id": user_id }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let member = token_for(user_id, ROLE_MEMBER, Some(ORG));
        let (status, _) = post_json(
            build_test_app(pool.clone()),
            "/api/v1/mood-entries",
            Some(&member),
            json!({ "valence": 0.6, "arousal": 0.5 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

fn key_body() -> serde_json::Value {
    let (start, end) = period();
    json!({ "org_id": ORG, "team_name": TEAM, "period_start": start, "period_end": end })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn aggregate_is_shown_for_large_enough_team(pool: PgPool) {
    seed_team(&pool, 5).await;
    let manager = token_for(500, ROLE_MANAGER, Some(ORG));

    let (status, json) = post_json(
        build_test_app(pool),
        "/api/v1/team-aggregates",
        Some(&manager),
        key_body(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["can_show"], true);
    assert_eq!(data["response_count"], 5);
    assert_eq!(data["color_mood"], COLOR_ENERGIZED);
    let phrases = data["phrases"].as_array().unwrap();
    assert!(phrases.len() <= 3);
    assert_eq!(phrases[0], PHRASE_MOOD_POSITIVE);
    assert_eq!(phrases[1], PHRASE_ENERGY_HIGH);
    assert_eq!(data["hints"]["engagement_level"], "low");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn small_team_is_suppressed_and_persisted(pool: PgPool) {
    seed_team(&pool, 3).await;
    let manager = token_for(500, ROLE_MANAGER, Some(ORG));
    let (start, end) = period();

    let (status, json) = post_json(
        build_test_app(pool.clone()),
        "/api/v1/team-aggregates",
        Some(&manager),
        key_body_for(&start, &end),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["can_show"], false);
    assert!(json["data"].get("phrases").is_none());
    assert!(json["data"].get("color_mood").is_none());

    let uri = format!(
        "/api/v1/team-aggregates?org_id={ORG}&team_name={TEAM}&period_start={start}&period_end={end}"
    );
    let (status, json) = get(build_test_app(pool), &uri, Some(&manager)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["can_show"], false);
    assert_eq!(json["data"]["response_count"], 3);
}

fn key_body_for(start: &str, end: &str) -> serde_json::Value {
    json!({ "org_id": ORG, "team_name": TEAM, "period_start": start, "period_end": end })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_aggregate_returns_404(pool: PgPool) {
    let manager = token_for(500, ROLE_MANAGER, Some(ORG));
    let (start, end) = period();
    let uri = format!(
        "/api/v1/team-aggregates?org_id={ORG}&team_name={TEAM}&period_start={start}&period_end={end}"
    );

    let (status, json) = get(build_test_app(pool), &uri, Some(&manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn members_cannot_read_aggregates(pool: PgPool) {
    let member = token_for(1, ROLE_MEMBER, Some(ORG));
    let (status, json) = post_json(
        build_test_app(pool),
        "/api/v1/team-aggregates",
        Some(&member),
        key_body(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn managers_are_scoped_to_their_org(pool: PgPool) {
    let other_manager = token_for(500, ROLE_MANAGER, Some(ORG + 1));
    let (status, _) = post_json(
        build_test_app(pool),
        "/api/v1/team-aggregates",
        Some(&other_manager),
        key_body(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inverted_period_is_rejected(pool: PgPool) {
    let manager = token_for(500, ROLE_MANAGER, Some(ORG));
    let (start, end) = period();
    let (status, _) = post_json(
        build_test_app(pool),
        "/api/v1/team-aggregates",
        Some(&manager),
        key_body_for(&end, &start),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_team_member_conflicts(pool: PgPool) {
    let admin = token_for(1000, ROLE_ADMIN, None);
    let body = json!({ "org_id": ORG, "team_name": TEAM, "user_id": 1 });

    let (status, _) = post_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/teams/members",
        Some(&admin),
        body.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = post_json(
        build_test_app(pool),
        "/api/v1/admin/teams/members",
        Some(&admin),
        body,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}
