//! LabelStudio settings and push

use anyhow::{bail, Result};
use avh_core::{ClientMode, LabelStudioSettings};
use clap::Subcommand;
use std::io::Write;

use crate::page::Page;
use crate::Console;

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show the stored settings
    Show,
    /// Store the LabelStudio address and access token
    LabelStudio {
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
    },
    /// Push a dataset or run to LabelStudio for annotation
    Push {
        #[arg(long = "dataset", value_name = "ID")]
        dataset: Option<String>,

        #[arg(long = "run", value_name = "ID")]
        run: Option<String>,
    },
}

impl SettingsCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Settings.header(out)?;
        match self {
            SettingsCommands::Show => {
                let settings = LabelStudioSettings::load(console.store.as_ref())?;
                if !settings.is_configured() {
                    writeln!(out, "LabelStudio: not configured")?;
                } else {
                    writeln!(out, "LabelStudio URL:   {}", settings.url)?;
                    writeln!(out, "LabelStudio token: {}", settings.masked_token())?;
                }
                let mode = match &console.config.mode {
                    ClientMode::Mock => "mock".to_string(),
                    ClientMode::Remote { base_url } => format!("remote ({})", base_url),
                };
                writeln!(out, "Resource client:   {}", mode)?;
                Ok(())
            }
            SettingsCommands::LabelStudio { url, token } => {
                let mut settings = LabelStudioSettings::load(console.store.as_ref())?;
                if let Some(url) = url {
                    settings.url = url.trim().to_string();
                }
                if let Some(token) = token {
                    settings.token = token.trim().to_string();
                }
                settings.save(console.store.as_ref())?;
                writeln!(out, "Saved LabelStudio settings")?;
                Ok(())
            }
            SettingsCommands::Push { dataset, run } => {
                if dataset.is_none() && run.is_none() {
                    bail!("choose what to push with --dataset or --run");
                }
                let settings = LabelStudioSettings::load(console.store.as_ref())?;
                if !settings.is_configured() {
                    bail!("LabelStudio is not configured; run `avh settings label-studio --url URL --token TOKEN`");
                }
                let request = settings.push_request(dataset, run)?;
                let response = console.client().push_to_label_studio(&request).await?;
                if !response.ok {
                    bail!("LabelStudio rejected the push");
                }
                writeln!(out, "Pushed to LabelStudio at {}", settings.url)?;
                Ok(())
            }
        }
    }
}
