//! The remote record store behind [`ProgressSync`](crate::ProgressSync).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use moodwell_core::error::CoreError;
use moodwell_core::progress::{ModuleProgress, ProgressUpdate};
use moodwell_core::types::DbId;
use moodwell_db::repositories::ModuleProgressRepo;
use moodwell_db::DbPool;

use crate::error::SyncError;

/// Durable storage for one row per `(user, module)`.
///
/// `save` must apply the update as a merge (see [`ModuleProgress::apply`]),
/// never as a blind overwrite, and return the resulting row.
#[async_trait]
pub trait ProgressStore: Send + Sync + 'static {
    /// Load a user's progress, creating a fresh row on a miss.
    async fn load_or_create(
        &self,
        user_id: DbId,
        module_name: &str,
    ) -> Result<ModuleProgress, SyncError>;

    /// Persist a coalesced update and return the merged row.
    async fn save(
        &self,
        user_id: DbId,
        module_name: &str,
        update: &ProgressUpdate,
    ) -> Result<ModuleProgress, SyncError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// Store backed directly by the `module_progress` table.
#[derive(Clone)]
pub struct PgProgressStore {
    pool: DbPool,
}

impl PgProgressStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn load_or_create(
        &self,
        user_id: DbId,
        module_name: &str,
    ) -> Result<ModuleProgress, SyncError> {
        let row = ModuleProgressRepo::find_or_create(&self.pool, user_id, module_name).await?;
        Ok(row.into_progress())
    }

    async fn save(
        &self,
        user_id: DbId,
        module_name: &str,
        update: &ProgressUpdate,
    ) -> Result<ModuleProgress, SyncError> {
        update.validate()?;
        let row = ModuleProgressRepo::apply_update(&self.pool, user_id, module_name, update).await?;
        Ok(row.into_progress())
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// In-process store with the same merge semantics as Postgres.
///
/// Records every update it receives so callers can inspect what was sent.
/// Can be switched into a failing mode to exercise error paths.
#[derive(Default)]
pub struct MemoryProgressStore {
    rows: Mutex<HashMap<(DbId, String), ModuleProgress>>,
    saves: Mutex<Vec<ProgressUpdate>>,
    failing: Mutex<bool>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row, replacing any existing one.
    pub fn insert(&self, user_id: DbId, progress: ModuleProgress) {
        let key = (user_id, progress.module_name.clone());
        lock(&self.rows).insert(key, progress.normalized());
    }

    pub fn get(&self, user_id: DbId, module_name: &str) -> Option<ModuleProgress> {
        lock(&self.rows)
            .get(&(user_id, module_name.to_string()))
            .cloned()
    }

    /// Every update passed to `save`, in call order (failed saves included).
    pub fn saves(&self) -> Vec<ProgressUpdate> {
        lock(&self.saves).clone()
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.failing) = failing;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load_or_create(
        &self,
        user_id: DbId,
        module_name: &str,
    ) -> Result<ModuleProgress, SyncError> {
        let mut rows = lock(&self.rows);
        let progress = rows
            .entry((user_id, module_name.to_string()))
            .or_insert_with(|| ModuleProgress::new(module_name));
        Ok(progress.clone())
    }

    async fn save(
        &self,
        user_id: DbId,
        module_name: &str,
        update: &ProgressUpdate,
    ) -> Result<ModuleProgress, SyncError> {
        lock(&self.saves).push(update.clone());
        if *lock(&self.failing) {
            return Err(SyncError::Core(CoreError::Internal(
                "memory store is failing".to_string(),
            )));
        }
        update.validate()?;

        let mut rows = lock(&self.rows);
        let progress = rows
            .entry((user_id, module_name.to_string()))
            .or_insert_with(|| ModuleProgress::new(module_name));
        progress.apply(update);
        Ok(progress.clone())
    }
}
