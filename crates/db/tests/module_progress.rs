//! Integration tests for the `module_progress` repository.
//!
//! Exercises lazy creation and the conflict-free merge performed by
//! `apply_update` against a real database.

use moodwell_core::progress::{
    level_for_xp, ProgressUpdate, MAX_METADATA_KEYS, MAX_TOTAL_XP,
};
use moodwell_db::repositories::ModuleProgressRepo;
use serde_json::json;
use sqlx::PgPool;

fn metadata(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("metadata must be an object"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_or_create_creates_once(pool: PgPool) {
    let first = ModuleProgressRepo::find_or_create(&pool, 1, "journal")
        .await
        .unwrap();
    let second = ModuleProgressRepo::find_or_create(&pool, 1, "journal")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.user_level, 1);
    assert_eq!(first.total_xp, 0);
    assert!(first.unlocked_items.is_empty());
    assert_eq!(first.metadata, json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn apply_update_inserts_missing_row(pool: PgPool) {
    let update = ProgressUpdate {
        total_xp: Some(1250),
        level: Some(3),
        xp_delta: 1250,
        unlocked_items: Some(vec!["b".into(), "a".into(), "a".into()]),
        metadata: None,
    };
    let row = ModuleProgressRepo::apply_update(&pool, 7, "meditation", &update)
        .await
        .unwrap();

    assert_eq!(row.total_xp, 1250);
    assert_eq!(row.user_level, 3);
    assert_eq!(row.unlocked_items, vec!["a".to_string(), "b".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_increments_are_not_lost(pool: PgPool) {
    ModuleProgressRepo::apply_update(
        &pool,
        1,
        "journal",
        &ProgressUpdate {
            xp_delta: 1000,
            total_xp: Some(1000),
            ..ProgressUpdate::default()
        },
    )
    .await
    .unwrap();

    // Two devices both started from 1000.
    for (delta, seen_total) in [(100, 1100), (50, 1050)] {
        ModuleProgressRepo::apply_update(
            &pool,
            1,
            "journal",
            &ProgressUpdate {
                xp_delta: delta,
                total_xp: Some(seen_total),
                ..ProgressUpdate::default()
            },
        )
        .await
        .unwrap();
    }

    let row = ModuleProgressRepo::find(&pool, 1, "journal")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.total_xp, 1150);
    assert_eq!(row.user_level, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn items_union_and_metadata_merges_per_key(pool: PgPool) {
    ModuleProgressRepo::apply_update(
        &pool,
        2,
        "breathwork",
        &ProgressUpdate {
            unlocked_items: Some(vec!["box".into()]),
            metadata: Some(metadata(json!({"theme": "ocean", "streak": 2}))),
            ..ProgressUpdate::default()
        },
    )
    .await
    .unwrap();

    let row = ModuleProgressRepo::apply_update(
        &pool,
        2,
        "breathwork",
        &ProgressUpdate {
            unlocked_items: Some(vec!["four_seven_eight".into()]),
            metadata: Some(metadata(json!({"streak": 3}))),
            ..ProgressUpdate::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(
        row.unlocked_items,
        vec!["box".to_string(), "four_seven_eight".to_string()]
    );
    assert_eq!(row.metadata, json!({"theme": "ocean", "streak": 3}));
    // No XP fields were sent, so XP is untouched.
    assert_eq!(row.total_xp, 0);
    assert_eq!(row.user_level, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn into_progress_recomputes_stale_level(pool: PgPool) {
    ModuleProgressRepo::find_or_create(&pool, 3, "journal")
        .await
        .unwrap();
    sqlx::query(
        "UPDATE module_progress SET total_xp = 1550, user_level = 1 \
         WHERE user_id = 3 AND module_name = 'journal'",
    )
    .execute(&pool)
    .await
    .unwrap();

    let progress = ModuleProgressRepo::find(&pool, 3, "journal")
        .await
        .unwrap()
        .unwrap()
        .into_progress();
    assert_eq!(progress.level, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_by_user_is_scoped_and_sorted(pool: PgPool) {
    for module in ["meditation", "journal"] {
        ModuleProgressRepo::find_or_create(&pool, 10, module)
            .await
            .unwrap();
    }
    ModuleProgressRepo::find_or_create(&pool, 11, "music")
        .await
        .unwrap();

    let rows = ModuleProgressRepo::list_by_user(&pool, 10).await.unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.module_name.as_str()).collect();
    assert_eq!(names, vec!["journal", "meditation"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn total_xp_is_capped_without_overflow(pool: PgPool) {
    let at_cap = ProgressUpdate {
        total_xp: Some(MAX_TOTAL_XP),
        xp_delta: MAX_TOTAL_XP,
        ..ProgressUpdate::default()
    };
    ModuleProgressRepo::apply_update(&pool, 1, "journal", &at_cap)
        .await
        .unwrap();
    let row = ModuleProgressRepo::apply_update(&pool, 1, "journal", &at_cap)
        .await
        .unwrap();

    assert_eq!(row.total_xp, MAX_TOTAL_XP);
    assert_eq!(row.user_level, level_for_xp(MAX_TOTAL_XP));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn metadata_merge_respects_key_limit(pool: PgPool) {
    let full: serde_json::Map<String, serde_json::Value> = (0..MAX_METADATA_KEYS - 1)
        .map(|i| (format!("k{i}"), json!(i)))
        .collect();
    ModuleProgressRepo::apply_update(
        &pool,
        1,
        "music",
        &ProgressUpdate {
            metadata: Some(full),
            ..ProgressUpdate::default()
        },
    )
    .await
    .unwrap();

    // A second device adds two keys it has never seen stored.
    let row = ModuleProgressRepo::apply_update(
        &pool,
        1,
        "music",
        &ProgressUpdate {
            metadata: Some(metadata(json!({"k0": "updated", "new_a": 1, "new_b": 2}))),
            ..ProgressUpdate::default()
        },
    )
    .await
    .unwrap();

    let stored = row.metadata.as_object().unwrap();
    assert_eq!(stored.len(), MAX_METADATA_KEYS - 1);
    assert_eq!(stored["k0"], json!("updated"));
    assert!(!stored.contains_key("new_a"));

    // One new key still fits.
    let row = ModuleProgressRepo::apply_update(
        &pool,
        1,
        "music",
        &ProgressUpdate {
            metadata: Some(metadata(json!({"new_a": 1}))),
            ..ProgressUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(row.metadata.as_object().unwrap().len(), MAX_METADATA_KEYS);
}
