//! Agent Validation Hub console library

pub mod agents;
pub mod console;
pub mod crawler;
pub mod dashboard;
pub mod datasets;
pub mod page;
pub mod render;
pub mod results;
pub mod runs;
pub mod settings;
pub mod spiders;
pub mod watch;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

use anyhow::Result;
use avh_core::ConfigOverrides;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

pub use console::Console;

#[derive(Parser)]
#[command(name = "avh")]
#[command(about = "Agent Validation Hub console")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every view
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Talk to the hub REST service at URL instead of the local mock
    #[arg(long, value_name = "URL", global = true)]
    pub remote: Option<String>,

    /// Force the local mock even when AVH_USE_MOCKS=false
    #[arg(long, global = true)]
    pub mock: bool,

    /// Polling interval for watch views, in milliseconds
    #[arg(long = "interval-ms", value_name = "MS", global = true)]
    pub interval_ms: Option<u64>,

    /// SQLite file holding local state
    #[arg(long = "state", value_name = "PATH", global = true)]
    pub state: Option<PathBuf>,

    /// API key sent to the hub REST service
    #[arg(long = "api-key", value_name = "KEY", global = true)]
    pub api_key: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            remote: self.remote.clone(),
            mock: self.mock,
            interval_ms: self.interval_ms,
            state_path: self.state.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Running tests and collection counts
    Dashboard,
    /// Launch preset crawlers and follow their jobs
    Crawler {
        #[command(subcommand)]
        subcommand: crawler::CrawlerCommands,
    },
    /// Registered spiders and their jobs
    Spiders {
        #[command(subcommand)]
        subcommand: spiders::SpiderCommands,
    },
    /// Test datasets
    Datasets {
        #[command(subcommand)]
        subcommand: datasets::DatasetCommands,
    },
    /// Questions inside datasets
    Questions {
        #[command(subcommand)]
        subcommand: datasets::QuestionCommands,
    },
    /// Agents under evaluation
    Agents {
        #[command(subcommand)]
        subcommand: agents::AgentCommands,
    },
    /// LLM and HTTP endpoints
    Endpoints {
        #[command(subcommand)]
        subcommand: agents::EndpointCommands,
    },
    /// Test runs
    Runs {
        #[command(subcommand)]
        subcommand: runs::RunCommands,
    },
    /// Test results and evaluations
    Results {
        #[command(subcommand)]
        subcommand: results::ResultCommands,
    },
    /// LabelStudio settings and push
    Settings {
        #[command(subcommand)]
        subcommand: settings::SettingsCommands,
    },
}

impl Commands {
    /// Render the selected view into `out`.
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        match self {
            Commands::Dashboard => dashboard::run(console, out).await,
            Commands::Crawler { subcommand } => subcommand.run(console, out).await,
            Commands::Spiders { subcommand } => subcommand.run(console, out).await,
            Commands::Datasets { subcommand } => subcommand.run(console, out).await,
            Commands::Questions { subcommand } => subcommand.run(console, out).await,
            Commands::Agents { subcommand } => subcommand.run(console, out).await,
            Commands::Endpoints { subcommand } => subcommand.run(console, out).await,
            Commands::Runs { subcommand } => subcommand.run(console, out).await,
            Commands::Results { subcommand } => subcommand.run(console, out).await,
            Commands::Settings { subcommand } => subcommand.run(console, out).await,
        }
    }
}
