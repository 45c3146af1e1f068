use moodwell_core::error::CoreError;

/// Errors returned by the progress synchronizer and its stores.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A domain-level error from `moodwell_core` (usually validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A transport or status error talking to the progress API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The background flusher has stopped.
    #[error("Progress synchronizer is closed")]
    Closed,
}
