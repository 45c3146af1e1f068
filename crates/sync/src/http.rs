//! [`ProgressStore`] over the HTTP API (`/progress/{module}`).

use async_trait::async_trait;
use moodwell_core::progress::{ModuleProgress, ProgressUpdate};
use moodwell_core::types::DbId;
use serde::Deserialize;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::store::ProgressStore;

/// `{ "data": T }` response envelope used by the API.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Store that talks to a remote Moodwell API with a bearer token.
///
/// The server identifies the user from the token, so the `user_id` passed
/// to the trait methods is only used for logging.
#[derive(Clone)]
pub struct HttpProgressStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpProgressStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    /// Store pointed at [`SyncConfig::api_url`].
    pub fn from_config(config: &SyncConfig, token: impl Into<String>) -> Self {
        Self::new(config.api_url.clone(), token)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn progress_url(&self, module_name: &str) -> String {
        format!("{}/progress/{module_name}", self.base_url)
    }
}

#[async_trait]
impl ProgressStore for HttpProgressStore {
    async fn load_or_create(
        &self,
        user_id: DbId,
        module_name: &str,
    ) -> Result<ModuleProgress, SyncError> {
        let envelope: DataEnvelope<ModuleProgress> = self
            .client
            .get(self.progress_url(module_name))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(user_id, module_name, "Loaded progress over HTTP");
        Ok(envelope.data.normalized())
    }

    async fn save(
        &self,
        user_id: DbId,
        module_name: &str,
        update: &ProgressUpdate,
    ) -> Result<ModuleProgress, SyncError> {
        let envelope: DataEnvelope<ModuleProgress> = self
            .client
            .put(self.progress_url(module_name))
            .bearer_auth(&self.token)
            .json(update)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(user_id, module_name, "Saved progress over HTTP");
        Ok(envelope.data.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_url_trims_trailing_slash() {
        let store = HttpProgressStore::new("http://localhost:3000/api/v1/", "token");
        assert_eq!(
            store.progress_url("journal"),
            "http://localhost:3000/api/v1/progress/journal"
        );
    }

    #[test]
    fn from_config_uses_api_url() {
        let config = SyncConfig {
            api_url: "https://moodwell.example/api/v1/".into(),
            ..SyncConfig::default()
        };
        let store = HttpProgressStore::from_config(&config, "token");
        assert_eq!(
            store.progress_url("sleep"),
            "https://moodwell.example/api/v1/progress/sleep"
        );
    }
}
