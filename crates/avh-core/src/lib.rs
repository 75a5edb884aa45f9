//! Console orchestration for the Agent Validation Hub.
//!
//! Configuration loading, the one-time choice between the REST and mock
//! clients, progress polling and the small pieces of view state shared by
//! the CLI pages.

pub mod client;
pub mod config;
pub mod crawler;
pub mod dashboard;
pub mod error;
pub mod job_log;
pub mod poller;
pub mod settings;

/// Core result type used throughout the console.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;

pub use client::{build_client, open_store};
pub use config::{ClientMode, ConfigOverrides, Credentials, HubConfig};
pub use crawler::{CrawlerPreset, PRESETS};
pub use dashboard::DashboardSummary;
pub use job_log::JobLog;
pub use poller::{PollHandle, Poller, Snapshot};
pub use settings::LabelStudioSettings;
