//! Spider registry and spider job views

use anyhow::{bail, Result};
use avh_api_contract::{JobStatus, JsonMap, Spider, SpiderJob, StartSpiderJobRequest};
use avh_client_api::ClientApiError;
use avh_core::Snapshot;
use chrono::Utc;
use clap::{Args, Subcommand};
use std::io::Write;

use crate::page::Page;
use crate::render::{json_cell, progress_cell, stats_cell, Table};
use crate::watch;
use crate::Console;

#[derive(Subcommand)]
pub enum SpiderCommands {
    /// List registered spiders
    List,
    /// Register a spider, or edit the one named by --id
    Save(SpiderSaveArgs),
    /// Start a job for a spider
    Start {
        #[arg(value_name = "SPIDER_ID")]
        spider_id: String,

        /// Follow the job until it finishes
        #[arg(long)]
        watch: bool,
    },
    /// List spider jobs
    Jobs {
        /// Only jobs of this spider
        #[arg(long = "spider", value_name = "ID")]
        spider: Option<String>,

        /// Keep refreshing until every running job finishes
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Args)]
pub struct SpiderSaveArgs {
    /// Id of the spider to edit
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// URL or feed the spider crawls
    #[arg(long)]
    pub target: Option<String>,

    /// Runner that executes the spider
    #[arg(long)]
    pub runner: Option<String>,

    /// Runner configuration as a JSON object
    #[arg(long, value_name = "JSON")]
    pub config: Option<String>,
}

impl SpiderCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Spiders.header(out)?;
        match self {
            SpiderCommands::List => list_spiders(console, out).await,
            SpiderCommands::Save(args) => args.run(console, out).await,
            SpiderCommands::Start { spider_id, watch } => {
                let request = StartSpiderJobRequest { spider_id };
                let started = console.client().start_spider_job(&request).await?;
                writeln!(out, "Started spider job {}", started.id)?;
                if watch {
                    follow_jobs(console, None, Some(started.id), out).await?;
                }
                Ok(())
            }
            SpiderCommands::Jobs { spider, watch } => {
                if watch {
                    follow_jobs(console, spider, None, out).await
                } else {
                    list_jobs(console, spider.as_deref(), out).await
                }
            }
        }
    }
}

async fn list_spiders(console: &Console, out: &mut dyn Write) -> Result<()> {
    let spiders = console.client().list_spiders().await?;
    if spiders.is_empty() {
        writeln!(out, "No spiders registered.")?;
        return Ok(());
    }

    let mut table = Table::new(&["ID", "NAME", "TARGET", "RUNNER", "CONFIG"]);
    for spider in &spiders {
        table.row([
            spider.id.clone(),
            spider.name.clone(),
            spider.target.clone(),
            spider.runner.clone(),
            json_cell(&spider.config),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

impl SpiderSaveArgs {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        let config = self.config.as_deref().map(crate::render::parse_json_map).transpose()?;

        let existing = match &self.id {
            Some(id) => console
                .client()
                .list_spiders()
                .await?
                .into_iter()
                .find(|s| &s.id == id),
            None => None,
        };

        let spider = match existing {
            Some(mut spider) => {
                if let Some(name) = self.name {
                    spider.name = name;
                }
                if let Some(target) = self.target {
                    spider.target = target;
                }
                if let Some(runner) = self.runner {
                    spider.runner = runner;
                }
                if let Some(config) = config {
                    spider.config = config;
                }
                spider
            }
            None => {
                let (Some(name), Some(target)) = (self.name, self.target) else {
                    bail!("a new spider needs --name and --target");
                };
                Spider {
                    id: self.id.unwrap_or_default(),
                    name,
                    target,
                    runner: self.runner.unwrap_or_else(|| "http_hook".to_string()),
                    config: config.unwrap_or_else(JsonMap::new),
                    created_at: Utc::now(),
                }
            }
        };

        let saved = console.client().save_spider(&spider).await?;
        writeln!(out, "Saved spider {} ({})", saved.id, saved.name)?;
        Ok(())
    }
}

fn spider_name(spiders: &[Spider], id: &str) -> String {
    spiders
        .iter()
        .find(|s| s.id == id)
        .map_or_else(|| id.to_string(), |s| s.name.clone())
}

async fn list_jobs(console: &Console, spider_id: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let jobs = console.client().list_spider_jobs(spider_id).await?;
    if jobs.is_empty() {
        writeln!(out, "No spider jobs yet.")?;
        return Ok(());
    }

    let spiders = console.client().list_spiders().await?;
    let mut table = Table::new(&["ID", "SPIDER", "PROGRESS", "STATS", "STATUS"]);
    for job in &jobs {
        table.row([
            job.id.clone(),
            spider_name(&spiders, &job.spider_id),
            progress_cell(job.progress),
            stats_cell(job.stats.as_ref()),
            job.status.to_string(),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

/// Follow one job, or every job running now (optionally of one spider).
async fn follow_jobs(
    console: &Console,
    spider_id: Option<String>,
    job_id: Option<String>,
    out: &mut dyn Write,
) -> Result<()> {
    let tracked: Vec<String> = match job_id {
        Some(id) => vec![id],
        None => console
            .client()
            .list_spider_jobs(spider_id.as_deref())
            .await?
            .into_iter()
            .filter(|j| j.status == JobStatus::Running)
            .map(|j| j.id)
            .collect(),
    };
    if tracked.is_empty() {
        writeln!(out, "No running spider jobs.")?;
        return Ok(());
    }

    let spiders = console.client().list_spiders().await?;
    let client = console.client.clone();
    let fetch = move || {
        let client = client.clone();
        let tracked = tracked.clone();
        async move {
            let jobs = client.list_spider_jobs(None).await?;
            Ok::<_, ClientApiError>(jobs.into_iter().filter(|j| tracked.contains(&j.id)).collect::<Vec<_>>())
        }
    };

    watch::follow(console.config.polling_interval, fetch, out, |snapshot: &Snapshot<SpiderJob>, out| {
        for job in &snapshot.records {
            writeln!(
                out,
                "{} {} {} {} {}",
                job.id,
                spider_name(&spiders, &job.spider_id),
                progress_cell(job.progress),
                stats_cell(job.stats.as_ref()),
                job.status
            )?;
        }
        Ok(())
    })
    .await
}
