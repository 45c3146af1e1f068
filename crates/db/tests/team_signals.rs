//! Integration tests for team membership, signal loading and aggregate
//! persistence.

use chrono::{Duration, TimeZone, Utc};
use moodwell_core::team_signals::{self, TeamAggregate};
use moodwell_core::types::Period;
use moodwell_db::models::badge::CreateBadgeAward;
use moodwell_db::models::mood_entry::CreateMoodEntry;
use moodwell_db::models::module_session::CreateModuleSession;
use moodwell_db::models::team::{CreateTeamMember, TeamAggregateKey};
use moodwell_db::repositories::{
    BadgeAwardRepo, MoodEntryRepo, ModuleSessionRepo, TeamAggregateRepo, TeamRepo,
};
use sqlx::PgPool;

const ORG: i64 = 42;
const TEAM: &str = "platform";

fn period() -> Period {
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
    Period::new(start, start + Duration::days(7)).unwrap()
}

async fn add_members(pool: &PgPool, user_ids: &[i64]) {
    for &user_id in user_ids {
        TeamRepo::add_member(
            pool,
            &CreateTeamMember {
                org_id: ORG,
                team_name: TEAM.to_string(),
                user_id,
            },
        )
        .await
        .unwrap();
    }
}

async fn add_mood(pool: &PgPool, user_id: i64, valence: f64, days_in: i64) {
    MoodEntryRepo::create(
        pool,
        user_id,
        &CreateMoodEntry {
            valence,
            arousal: 0.1,
            note: None,
            recorded_at: Some(period().start + Duration::days(days_in)),
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_member_is_rejected(pool: PgPool) {
    add_members(&pool, &[1]).await;
    let err = TeamRepo::add_member(
        &pool,
        &CreateTeamMember {
            org_id: ORG,
            team_name: TEAM.to_string(),
            user_id: 1,
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_team_members_org_team_user"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn load_signals_filters_by_team_and_period(pool: PgPool) {
    add_members(&pool, &[1, 2]).await;

    add_mood(&pool, 1, 0.5, 1).await;
    add_mood(&pool, 2, -0.5, 2).await;
    // Outside the period.
    add_mood(&pool, 1, 0.9, 8).await;
    add_mood(&pool, 1, 0.9, -1).await;
    // Not a team member.
    add_mood(&pool, 99, 0.9, 1).await;

    ModuleSessionRepo::create(
        &pool,
        2,
        &CreateModuleSession {
            module_name: "meditation".into(),
            duration_secs: 600,
            started_at: Some(period().start + Duration::hours(5)),
        },
    )
    .await
    .unwrap();

    BadgeAwardRepo::create(
        &pool,
        &CreateBadgeAward {
            user_id: 1,
            badge_code: "late_night_streak".into(),
            awarded_at: Some(period().start + Duration::days(3)),
        },
    )
    .await
    .unwrap();

    let signals = TeamRepo::load_signals(&pool, ORG, TEAM, period())
        .await
        .unwrap();

    assert_eq!(signals.member_count, 2);
    assert_eq!(signals.moods.len(), 2);
    assert_eq!(signals.sessions.len(), 1);
    assert_eq!(signals.badges.len(), 1);
    assert_eq!(signals.response_count(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn aggregate_upsert_replaces_previous_result(pool: PgPool) {
    let key = TeamAggregateKey {
        org_id: ORG,
        team_name: TEAM.to_string(),
        period_start: period().start,
        period_end: period().end,
    };

    let suppressed = TeamAggregate {
        can_show: false,
        phrases: None,
        hints: None,
        color_mood: None,
        response_count: 2,
    };
    let first = TeamAggregateRepo::upsert(&pool, &key, &suppressed)
        .await
        .unwrap();

    add_members(&pool, &[1, 2, 3, 4, 5]).await;
    for user_id in 1..=5 {
        add_mood(&pool, user_id, 0.6, 1).await;
    }
    let signals = TeamRepo::load_signals(&pool, ORG, TEAM, period())
        .await
        .unwrap();
    let computed = team_signals::aggregate(&signals);
    assert!(computed.can_show);

    let second = TeamAggregateRepo::upsert(&pool, &key, &computed)
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let stored = TeamAggregateRepo::find(&pool, &key)
        .await
        .unwrap()
        .unwrap()
        .into_aggregate();
    assert_eq!(stored, computed);
}
