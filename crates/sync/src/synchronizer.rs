//! Debounced progress synchronizer.
//!
//! [`ProgressSync`] keeps the caller's view of a module's progress in memory
//! and updates it immediately on every mutation. The changed fields are sent
//! to a background flusher task that coalesces them into one pending
//! [`ProgressUpdate`] and persists it once the debounce window has passed
//! without further mutations. Closing the handle makes the flusher persist
//! whatever is still pending and waits for it. Dropping the handle does the
//! same on a multi-thread runtime; on a current-thread runtime the final save
//! runs only if the runtime keeps polling, so use [`ProgressSync::close`].
//!
//! Saves are optimistic: a failed save is logged and reported as
//! [`SyncEvent::SaveFailed`], the local state is kept, and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use moodwell_core::progress::{
    validate_module_name, ExperienceGain, ModuleProgress, ProgressUpdate,
};
use moodwell_core::types::DbId;
use serde_json::Value;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::store::ProgressStore;

/// Buffer size for the event channel.
const EVENT_CAPACITY: usize = 64;

/// Message shown to users when a save fails.
pub const SAVE_FAILED_MESSAGE: &str = "Your progress could not be saved right now.";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Observable synchronizer events. Purely informational.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// An experience gain moved the local level up.
    LevelUp {
        module_name: String,
        previous_level: i32,
        level: i32,
    },
    /// A coalesced update was persisted; carries the store's merged row.
    Saved {
        module_name: String,
        progress: ModuleProgress,
    },
    /// A coalesced update could not be persisted.
    SaveFailed { module_name: String, message: String },
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

enum Command {
    Schedule(ProgressUpdate),
    Flush(oneshot::Sender<()>),
    /// Persist anything pending and stop.
    Shutdown,
}

/// Local mirror of one user's progress in one module.
#[derive(Debug)]
pub struct ProgressSync {
    user_id: DbId,
    progress: ModuleProgress,
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<SyncEvent>,
    flusher: Option<JoinHandle<()>>,
    /// Set when a change is scheduled, cleared by a completed flush.
    unsaved: bool,
}

impl ProgressSync {
    /// Load (or lazily create) the user's progress and start the flusher.
    pub async fn open(
        store: Arc<dyn ProgressStore>,
        user_id: DbId,
        module_name: &str,
        config: &SyncConfig,
    ) -> Result<Self, SyncError> {
        validate_module_name(module_name)?;
        let progress = store.load_or_create(user_id, module_name).await?;

        let (commands, receiver) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let flusher = Flusher {
            store,
            user_id,
            module_name: module_name.to_string(),
            debounce: config.debounce,
            events: events.clone(),
        };
        let handle = tokio::spawn(flusher.run(receiver));

        tracing::debug!(
            user_id,
            module_name,
            level = progress.level,
            total_xp = progress.total_xp,
            "Progress sync opened",
        );

        Ok(Self {
            user_id,
            progress,
            commands,
            events,
            flusher: Some(handle),
            unsaved: false,
        })
    }

    /// Current local progress, including changes not yet persisted.
    pub fn progress(&self) -> &ModuleProgress {
        &self.progress
    }

    pub fn user_id(&self) -> DbId {
        self.user_id
    }

    /// Observe level-ups and save outcomes.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Add experience, optionally unlocking an item, and schedule a save of
    /// `total_xp`, `level` and `unlocked_items`.
    pub fn add_experience(
        &mut self,
        amount: i64,
        unlock_item_id: Option<&str>,
    ) -> Result<ExperienceGain, SyncError> {
        self.ensure_open()?;
        let gain = self.progress.add_experience(amount, unlock_item_id)?;

        if gain.leveled_up() {
            tracing::info!(
                user_id = self.user_id,
                module_name = %self.progress.module_name,
                previous_level = gain.previous_level,
                level = gain.level,
                "Level up",
            );
            // No subscribers is fine.
            let _ = self.events.send(SyncEvent::LevelUp {
                module_name: self.progress.module_name.clone(),
                previous_level: gain.previous_level,
                level: gain.level,
            });
        }

        self.schedule(ProgressUpdate::experience(&self.progress, amount))?;
        Ok(gain)
    }

    /// Unlock an item. Returns `false` (and schedules nothing) when it was
    /// already unlocked.
    pub fn unlock_item(&mut self, item_id: &str) -> Result<bool, SyncError> {
        self.ensure_open()?;
        let unlocked = self.progress.unlock_item(item_id)?;
        if unlocked {
            self.schedule(ProgressUpdate::unlocks(&self.progress))?;
        }
        Ok(unlocked)
    }

    /// Set one metadata key and schedule a save of the metadata map.
    pub fn set_metadata(&mut self, key: &str, value: Value) -> Result<(), SyncError> {
        self.ensure_open()?;
        self.progress.set_metadata(key, value)?;
        self.schedule(ProgressUpdate::metadata(&self.progress))
    }

    /// Persist the pending update now instead of waiting for the timer.
    ///
    /// Resolves once the save has completed or failed. Does nothing when
    /// there is no pending update.
    pub async fn flush(&mut self) -> Result<(), SyncError> {
        let (done, wait) = oneshot::channel();
        self.commands
            .send(Command::Flush(done))
            .map_err(|_| SyncError::Closed)?;
        wait.await.map_err(|_| SyncError::Closed)?;
        self.unsaved = false;
        Ok(())
    }

    /// Tear down: persist any pending update and wait for the flusher to stop.
    ///
    /// This is the teardown that is guaranteed on every runtime flavor.
    pub async fn close(mut self) -> Result<(), SyncError> {
        let Some(handle) = self.flusher.take() else {
            return Ok(());
        };
        let _ = self.commands.send(Command::Shutdown);
        self.unsaved = false;
        handle.await.map_err(|e| {
            tracing::error!(error = %e, "Progress flusher task failed");
            SyncError::Closed
        })
    }

    fn ensure_open(&self) -> Result<(), SyncError> {
        if self.commands.is_closed() {
            return Err(SyncError::Closed);
        }
        Ok(())
    }

    fn schedule(&mut self, update: ProgressUpdate) -> Result<(), SyncError> {
        self.commands
            .send(Command::Schedule(update))
            .map_err(|_| SyncError::Closed)?;
        self.unsaved = true;
        Ok(())
    }
}

impl Drop for ProgressSync {
    fn drop(&mut self) {
        let Some(flusher) = self.flusher.take() else {
            return;
        };
        if self.commands.send(Command::Shutdown).is_err() || !self.unsaved {
            return;
        }

        // Wait for the final save where blocking a worker is allowed.
        match Handle::try_current() {
            Ok(runtime) if runtime.runtime_flavor() == RuntimeFlavor::MultiThread => {
                let joined =
                    tokio::task::block_in_place(|| runtime.block_on(flusher));
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Progress flusher task failed");
                }
            }
            _ => {
                tracing::warn!(
                    user_id = self.user_id,
                    module_name = %self.progress.module_name,
                    "Progress sync dropped with unsaved changes; \
                     they are saved only if the runtime keeps running",
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Flusher
// ---------------------------------------------------------------------------

/// Background task that owns the pending update and the debounce timer.
struct Flusher {
    store: Arc<dyn ProgressStore>,
    user_id: DbId,
    module_name: String,
    debounce: Duration,
    events: broadcast::Sender<SyncEvent>,
}

impl Flusher {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut pending = ProgressUpdate::default();
        let mut deadline: Option<Instant> = None;

        loop {
            let armed = deadline;
            let timer = async move {
                match armed {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Schedule(update)) => {
                        pending.merge(update);
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(Command::Flush(done)) => {
                        deadline = None;
                        self.persist(&mut pending).await;
                        let _ = done.send(());
                    }
                    Some(Command::Shutdown) | None => {
                        self.persist(&mut pending).await;
                        break;
                    }
                },
                () = timer => {
                    deadline = None;
                    self.persist(&mut pending).await;
                }
            }
        }

        tracing::debug!(
            user_id = self.user_id,
            module_name = %self.module_name,
            "Progress flusher stopped",
        );
    }

    /// Issue exactly one save for the pending update, if any, and clear it.
    async fn persist(&self, pending: &mut ProgressUpdate) {
        if pending.is_empty() {
            return;
        }
        let update = std::mem::take(pending);

        match self.store.save(self.user_id, &self.module_name, &update).await {
            Ok(progress) => {
                tracing::debug!(
                    user_id = self.user_id,
                    module_name = %self.module_name,
                    xp_delta = update.xp_delta,
                    total_xp = progress.total_xp,
                    "Progress saved",
                );
                let _ = self.events.send(SyncEvent::Saved {
                    module_name: self.module_name.clone(),
                    progress,
                });
            }
            Err(e) => {
                tracing::error!(
                    user_id = self.user_id,
                    module_name = %self.module_name,
                    error = %e,
                    "Failed to save progress",
                );
                let _ = self.events.send(SyncEvent::SaveFailed {
                    module_name: self.module_name.clone(),
                    message: SAVE_FAILED_MESSAGE.to_string(),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
