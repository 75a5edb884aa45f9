//! Shared state handed to every view

use anyhow::{Context, Result};
use avh_client_api::ClientApi;
use avh_core::HubConfig;
use avh_local_db::KeyValueStore;
use std::sync::Arc;

use crate::GlobalArgs;

pub struct Console {
    pub config: HubConfig,
    /// Local state file; also backs the mock collections in mock mode
    pub store: Arc<dyn KeyValueStore>,
    pub client: Arc<dyn ClientApi>,
}

impl Console {
    pub fn new(config: HubConfig, store: Arc<dyn KeyValueStore>, client: Arc<dyn ClientApi>) -> Self {
        Self {
            config,
            store,
            client,
        }
    }

    /// Load configuration and choose the resource client once for this process.
    pub fn open(args: &GlobalArgs) -> Result<Self> {
        let config = HubConfig::from_env()
            .context("Failed to load configuration")?
            .apply(&args.overrides())?;
        let store = avh_core::open_store(&config).with_context(|| {
            format!("Failed to open state file {}", config.state_path.display())
        })?;
        let client = avh_core::build_client(&config, store.clone())?;
        Ok(Self::new(config, store, client))
    }

    pub fn client(&self) -> &dyn ClientApi {
        self.client.as_ref()
    }
}
