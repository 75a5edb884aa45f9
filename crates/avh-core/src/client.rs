//! Resource client selection

use crate::config::{ClientMode, HubConfig};
use crate::Result;
use avh_client_api::ClientApi;
use avh_local_db::{Database, KeyValueStore, SqliteStore};
use avh_rest_client::{AuthMethod, RestClient};
use avh_rest_client_mock::MockClient;
use std::sync::Arc;

/// Open the local state store named by `config`.
pub fn open_store(config: &HubConfig) -> Result<Arc<dyn KeyValueStore>> {
    let db = Database::open(&config.state_path)?;
    Ok(Arc::new(SqliteStore::new(db)))
}

/// Build the client the console uses for its whole lifetime.
///
/// Mock mode shares `store` with the settings collection so both live in the
/// same state file.
pub fn build_client(config: &HubConfig, store: Arc<dyn KeyValueStore>) -> Result<Arc<dyn ClientApi>> {
    match &config.mode {
        ClientMode::Mock => {
            tracing::info!(path = %config.state_path.display(), "using local mock client");
            let client = MockClient::new(store)?.with_latency(config.mock_latency);
            Ok(Arc::new(client))
        }
        ClientMode::Remote { base_url } => {
            tracing::info!(%base_url, "using REST client");
            let auth = AuthMethod::from_credentials(
                config.credentials.api_key.clone(),
                config.credentials.bearer_token.clone(),
            )?;
            Ok(Arc::new(RestClient::new(base_url.clone(), auth)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use avh_local_db::MemoryStore;
    use std::time::Duration;

    fn config(mode: ClientMode) -> HubConfig {
        HubConfig {
            mode,
            polling_interval: Duration::from_millis(100),
            mock_latency: Duration::ZERO,
            state_path: "unused.db".into(),
            credentials: Credentials::default(),
        }
    }

    #[tokio::test]
    async fn test_mock_mode_serves_seed_data() {
        let client = build_client(&config(ClientMode::Mock), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(client.list_datasets().await.unwrap().len(), 2);
    }

    #[test]
    fn test_remote_mode_rejects_two_credentials() {
        let mut config = config(ClientMode::Remote {
            base_url: "http://localhost:8000".parse().unwrap(),
        });
        config.credentials = Credentials {
            api_key: Some("a".into()),
            bearer_token: Some("b".into()),
        };
        let result = build_client(&config, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(crate::Error::Rest(_))));
    }

    #[test]
    fn test_open_store_uses_state_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = config(ClientMode::Mock);
        config.state_path = dir.path().join("nested").join("state.db");
        open_store(&config).unwrap();
        assert!(config.state_path.exists());
    }
}
