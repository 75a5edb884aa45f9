//! LabelStudio access settings kept in the local state store

use crate::Result;
use avh_api_contract::{validation, LabelStudioPushRequest};
use avh_local_db::KeyValueStore;

pub const URL_SLOT: &str = "avh_ls_url";
pub const TOKEN_SLOT: &str = "avh_ls_token";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelStudioSettings {
    pub url: String,
    pub token: String,
}

impl LabelStudioSettings {
    /// Stored settings; missing values read as empty strings.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(Self {
            url: store.read(URL_SLOT)?.unwrap_or_default(),
            token: store.read(TOKEN_SLOT)?.unwrap_or_default(),
        })
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.write(URL_SLOT, &self.url)?;
        store.write(TOKEN_SLOT, &self.token)?;
        tracing::info!(url = %self.url, "saved LabelStudio settings");
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Token with everything but the last four characters hidden.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }

    /// Push request for a dataset and/or run using these settings.
    pub fn push_request(
        &self,
        dataset_id: Option<String>,
        run_id: Option<String>,
    ) -> Result<LabelStudioPushRequest> {
        let request = LabelStudioPushRequest {
            dataset_id,
            run_id,
            url: self.url.clone(),
            token: self.token.clone(),
        };
        validation::validate(&request).map_err(|e| crate::Error::config(e.to_string()))?;
        Ok(request)
    }
}
