//! Runs the synchronizer against the Postgres-backed store.

use std::sync::Arc;
use std::time::Duration;

use moodwell_db::repositories::ModuleProgressRepo;
use moodwell_sync::{PgProgressStore, ProgressSync, SyncConfig};
use serde_json::json;
use sqlx::PgPool;

fn config() -> SyncConfig {
    SyncConfig {
        debounce: Duration::from_millis(50),
        ..SyncConfig::default()
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn close_persists_pending_progress(pool: PgPool) {
    let store = Arc::new(PgProgressStore::new(pool.clone()));
    let mut sync = ProgressSync::open(store, 5, "journal", &config())
        .await
        .unwrap();

    sync.add_experience(300, Some("quill")).unwrap();
    sync.add_experience(300, None).unwrap();
    sync.set_metadata("prompt", json!("rest")).unwrap();
    sync.close().await.unwrap();

    let row = ModuleProgressRepo::find(&pool, 5, "journal")
        .await
        .unwrap()
        .expect("row created on open");
    assert_eq!(row.total_xp, 600);
    assert_eq!(row.user_level, 2);
    assert_eq!(row.unlocked_items, vec!["quill".to_string()]);
    assert_eq!(row.metadata, json!({"prompt": "rest"}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn two_sessions_do_not_lose_increments(pool: PgPool) {
    let store = Arc::new(PgProgressStore::new(pool.clone()));
    let mut phone = ProgressSync::open(store.clone(), 9, "meditation", &config())
        .await
        .unwrap();
    let mut laptop = ProgressSync::open(store, 9, "meditation", &config())
        .await
        .unwrap();

    phone.add_experience(100, None).unwrap();
    laptop.add_experience(250, None).unwrap();
    phone.close().await.unwrap();
    laptop.close().await.unwrap();

    let row = ModuleProgressRepo::find(&pool, 9, "meditation")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.total_xp, 350);
}
