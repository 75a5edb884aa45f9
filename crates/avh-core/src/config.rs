//! Console configuration
//!
//! Values come from the environment first and are then overlaid with
//! command-line flags through [`ConfigOverrides`].

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(3000);
pub const MIN_POLLING_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_millis(150);

/// Which resource client the console talks to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientMode {
    /// Locally persisted mock
    Mock,
    /// Hub REST service at `base_url`
    Remote { base_url: Url },
}

/// Credentials sent in remote mode
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubConfig {
    pub mode: ClientMode,
    pub polling_interval: Duration,
    pub mock_latency: Duration,
    /// SQLite file holding mock collections and settings
    pub state_path: PathBuf,
    pub credentials: Credentials,
}

impl HubConfig {
    /// Load configuration from the process environment.
    ///
    /// Recognised variables:
    /// - `AVH_USE_MOCKS`: `false`/`0`/`no` selects remote mode (default: mock)
    /// - `AVH_API_BASE_URL`: REST base URL (default: `http://localhost:8000`)
    /// - `AVH_POLLING_INTERVAL_MS`: poll period (default: 3000, minimum: 100)
    /// - `AVH_MOCK_LATENCY_MS`: simulated mock delay (default: 150)
    /// - `AVH_HOME`: directory of `state.db` (default: platform state dir)
    /// - `AVH_API_KEY` / `AVH_BEARER_TOKEN`: remote credentials
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let use_mocks = match var("AVH_USE_MOCKS") {
            Some(raw) => parse_flag("AVH_USE_MOCKS", &raw)?,
            None => true,
        };

        let mode = if use_mocks {
            ClientMode::Mock
        } else {
            let raw = var("AVH_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
            ClientMode::Remote {
                base_url: parse_base_url(&raw)?,
            }
        };

        let polling_interval = match var("AVH_POLLING_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(parse_millis("AVH_POLLING_INTERVAL_MS", &raw)?),
            None => DEFAULT_POLLING_INTERVAL,
        };

        let mock_latency = match var("AVH_MOCK_LATENCY_MS") {
            Some(raw) => Duration::from_millis(parse_millis("AVH_MOCK_LATENCY_MS", &raw)?),
            None => DEFAULT_MOCK_LATENCY,
        };

        let state_path = match var("AVH_HOME") {
            Some(home) => PathBuf::from(home).join("state.db"),
            None => avh_local_db::Database::default_path()?,
        };

        let config = Self {
            mode,
            polling_interval: polling_interval.max(MIN_POLLING_INTERVAL),
            mock_latency,
            state_path,
            credentials: Credentials {
                api_key: var("AVH_API_KEY"),
                bearer_token: var("AVH_BEARER_TOKEN"),
            },
        };
        tracing::debug!(?config.mode, interval = ?config.polling_interval, "loaded configuration");
        Ok(config)
    }

    pub fn is_mock(&self) -> bool {
        matches!(self.mode, ClientMode::Mock)
    }

    /// Overlay command-line values on top of this configuration.
    pub fn apply(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if overrides.mock && overrides.remote.is_some() {
            return Err(Error::config("--mock and --remote cannot be combined"));
        }
        if let Some(raw) = &overrides.remote {
            self.mode = ClientMode::Remote {
                base_url: parse_base_url(raw)?,
            };
        }
        if overrides.mock {
            self.mode = ClientMode::Mock;
        }
        if let Some(ms) = overrides.interval_ms {
            self.polling_interval = Duration::from_millis(ms).max(MIN_POLLING_INTERVAL);
        }
        if let Some(path) = &overrides.state_path {
            self.state_path = path.clone();
        }
        if let Some(key) = &overrides.api_key {
            self.credentials.api_key = Some(key.clone());
        }
        Ok(self)
    }
}

/// Values supplied on the command line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub remote: Option<String>,
    pub mock: bool,
    pub interval_ms: Option<u64>,
    pub state_path: Option<PathBuf>,
    pub api_key: Option<String>,
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::config(format!("{} must be a boolean, got '{}'", name, other))),
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::config(format!("{} must be a whole number of milliseconds, got '{}'", name, raw)))
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::config(format!("invalid API base URL '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!("API base URL must be http(s), got '{}'", raw)));
    }
    Ok(url)
}
