//! Crawler launcher and job log panel

use anyhow::{anyhow, Result};
use avh_api_contract::CrawlJob;
use avh_client_api::ClientApiError;
use avh_core::crawler::source_label;
use avh_core::{CrawlerPreset, JobLog, Snapshot, PRESETS};
use chrono::Local;
use clap::Subcommand;
use std::io::Write;

use crate::page::Page;
use crate::render::{optional_timestamp, progress_cell, stats_cell, Table, BAR_WIDTH};
use crate::watch;
use crate::Console;

#[derive(Subcommand)]
pub enum CrawlerCommands {
    /// Show the crawler presets and their default commands
    Presets,
    /// Start a crawler job from a preset
    Start {
        /// Preset key or label (xueqiu, guba, ttjj)
        #[arg(value_name = "PRESET")]
        preset: String,

        /// Command line to run instead of the preset default
        #[arg(long, value_name = "CMD")]
        command: Option<String>,

        /// Open the job log panel after starting
        #[arg(long)]
        watch: bool,
    },
    /// List crawler jobs
    Jobs {
        /// Show the details of one job
        #[arg(long, value_name = "JOB_ID")]
        expand: Option<String>,
    },
    /// Follow one job in the log panel (defaults to the newest job)
    Watch {
        #[arg(value_name = "JOB_ID")]
        id: Option<String>,
    },
}

impl CrawlerCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Crawler.header(out)?;
        match self {
            CrawlerCommands::Presets => presets(out),
            CrawlerCommands::Start {
                preset,
                command,
                watch,
            } => {
                let preset = CrawlerPreset::find(&preset).ok_or_else(|| {
                    let keys: Vec<_> = PRESETS.iter().map(|p| p.key).collect();
                    anyhow!("unknown crawler preset '{}', expected one of: {}", preset, keys.join(", "))
                })?;
                let spiders = console.client().list_spiders().await?;
                let request = preset.start_request(&spiders, command.as_deref())?;
                let started = console.client().start_crawl(&request).await?;
                writeln!(out, "Started {} crawler job {}", preset.label, started.id)?;
                writeln!(out, "$ {}", request.command)?;

                if watch {
                    let mut log = JobLog::new(started.id);
                    log.started(Local::now().time());
                    follow(console, log, out).await?;
                }
                Ok(())
            }
            CrawlerCommands::Jobs { expand } => jobs(console, expand.as_deref(), out).await,
            CrawlerCommands::Watch { id } => {
                let jobs = console.client().list_crawl_jobs().await?;
                let id = match id {
                    Some(id) if jobs.iter().any(|j| j.id == id) => id,
                    Some(id) => return Err(anyhow!("crawler job {} not found", id)),
                    None => jobs
                        .into_iter()
                        .next()
                        .map(|j| j.id)
                        .ok_or_else(|| anyhow!("no crawler jobs to follow"))?,
                };
                follow(console, JobLog::new(id), out).await
            }
        }
    }
}

fn presets(out: &mut dyn Write) -> Result<()> {
    let mut table = Table::new(&["KEY", "LABEL", "DEFAULT COMMAND"]);
    for preset in PRESETS {
        table.row([preset.key.to_string(), preset.label.to_string(), preset.default_command()]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

async fn jobs(console: &Console, expand: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let jobs = console.client().list_crawl_jobs().await?;
    if jobs.is_empty() {
        writeln!(out, "No crawler jobs yet.")?;
        return Ok(());
    }

    let mut table = Table::new(&["ID", "SOURCE", "PROGRESS", "STATS", "STATUS"]);
    for job in &jobs {
        table.row([
            job.id.clone(),
            source_label(&job.source).to_string(),
            progress_cell(job.progress),
            stats_cell(job.stats.as_ref()),
            job.status.to_string(),
        ]);
    }
    write!(out, "{}", table.render())?;

    if let Some(id) = expand {
        let job = jobs
            .iter()
            .find(|j| j.id == id)
            .ok_or_else(|| anyhow!("crawler job {} not found", id))?;
        writeln!(out)?;
        details(job, out)?;
    }
    Ok(())
}

fn details(job: &CrawlJob, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Job:      {}", job.id)?;
    writeln!(out, "Source:   {}", source_label(&job.source))?;
    writeln!(out, "Command:  {}", job.command)?;
    writeln!(out, "Progress: {}", job.progress)?;
    writeln!(out, "Status:   {}", job.status)?;
    writeln!(out, "Started:  {}", optional_timestamp(job.started_at))?;
    if job.finished_at.is_some() {
        writeln!(out, "Finished: {}", optional_timestamp(job.finished_at))?;
    }
    if let Some(error) = job.error.as_deref() {
        writeln!(out, "Error:    {}", error)?;
    }
    let note = if job.status.is_terminal() {
        "results written to the test data tables"
    } else {
        "running..."
    };
    writeln!(out, "{}", note)?;
    Ok(())
}

async fn follow(console: &Console, mut log: JobLog, out: &mut dyn Write) -> Result<()> {
    for line in log.lines() {
        writeln!(out, "{}", line)?;
    }

    let client = console.client.clone();
    let job_id = log.job_id().to_string();
    let fetch = move || {
        let client = client.clone();
        let job_id = job_id.clone();
        async move {
            let jobs = client.list_crawl_jobs().await?;
            Ok::<_, ClientApiError>(jobs.into_iter().filter(|j| j.id == job_id).collect::<Vec<_>>())
        }
    };

    let mut waiting_reported = false;
    watch::follow(console.config.polling_interval, fetch, out, |snapshot: &Snapshot<CrawlJob>, out| {
        let Some(job) = snapshot.records.first() else {
            if !waiting_reported {
                writeln!(out, "Waiting for job {}", log.job_id())?;
                waiting_reported = true;
            }
            return Ok(());
        };
        waiting_reported = false;
        if let Some(line) = log.observe(job, Local::now().time()) {
            writeln!(out, "{}  {}", line, job.progress.render_bar(BAR_WIDTH))?;
        }
        Ok(())
    })
    .await
}
