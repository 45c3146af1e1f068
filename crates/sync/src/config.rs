use std::time::Duration;

/// Default idle window before a coalesced save is issued.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Default base URL of the progress API.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

/// Synchronizer configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period after the last mutation before saving.
    pub debounce: Duration,
    /// Base URL used by [`HttpProgressStore`](crate::HttpProgressStore).
    pub api_url: String,
}

impl SyncConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                        |
    /// |-----------------------------|--------------------------------|
    /// | `PROGRESS_SYNC_DEBOUNCE_MS` | `1000`                         |
    /// | `PROGRESS_API_URL`          | `http://localhost:3000/api/v1` |
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let debounce_ms: u64 = std::env::var("PROGRESS_SYNC_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DEBOUNCE_MS);

        let api_url =
            std::env::var("PROGRESS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        Self {
            debounce: Duration::from_millis(debounce_ms),
            api_url,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}
