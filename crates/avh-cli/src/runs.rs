//! Test run views

use anyhow::{bail, Result};
use avh_api_contract::{Agent, Dataset, JobStatus, StartTestRunRequest, TestRun};
use avh_client_api::ClientApiError;
use avh_core::Snapshot;
use clap::Subcommand;
use std::collections::BTreeSet;
use std::io::Write;

use crate::page::Page;
use crate::render::{optional_timestamp, progress_cell, Table};
use crate::watch;
use crate::Console;

#[derive(Subcommand)]
pub enum RunCommands {
    /// Start a run of an agent against a dataset
    Start {
        #[arg(long = "dataset", value_name = "ID")]
        dataset: String,

        #[arg(long = "agent", value_name = "ID")]
        agent: String,

        /// Follow the run until it finishes
        #[arg(long)]
        watch: bool,
    },
    /// List every run
    List,
    /// Follow running test runs until they finish
    Watch {
        /// Only follow this run
        #[arg(value_name = "RUN_ID")]
        id: Option<String>,
    },
}

impl RunCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::TestRuns.header(out)?;
        match self {
            RunCommands::Start {
                dataset,
                agent,
                watch,
            } => {
                let request = StartTestRunRequest {
                    dataset_id: dataset,
                    agent_id: agent,
                };
                let started = console.client().start_test_run(&request).await?;
                writeln!(out, "Started test run {}", started.id)?;
                if watch {
                    follow(console, BTreeSet::from([started.id]), out).await?;
                }
                Ok(())
            }
            RunCommands::List => list(console, out).await,
            RunCommands::Watch { id } => {
                let tracked: BTreeSet<String> = match id {
                    Some(id) => BTreeSet::from([id]),
                    None => console
                        .client()
                        .list_test_runs()
                        .await?
                        .into_iter()
                        .filter(|r| r.status == JobStatus::Running)
                        .map(|r| r.id)
                        .collect(),
                };
                if tracked.is_empty() {
                    writeln!(out, "No running test runs.")?;
                    return Ok(());
                }
                follow(console, tracked, out).await
            }
        }
    }
}

/// Names of the datasets and agents a run refers to
struct Lookup {
    datasets: Vec<Dataset>,
    agents: Vec<Agent>,
}

impl Lookup {
    async fn load(console: &Console) -> Result<Self> {
        Ok(Self {
            datasets: console.client().list_datasets().await?,
            agents: console.client().list_agents().await?,
        })
    }

    fn dataset(&self, id: &str) -> String {
        self.datasets
            .iter()
            .find(|d| d.id == id)
            .map_or_else(|| id.to_string(), |d| d.name.clone())
    }

    fn agent(&self, id: &str) -> String {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .map_or_else(|| id.to_string(), |a| a.name.clone())
    }
}

fn table(runs: &[TestRun], lookup: &Lookup) -> Table {
    let mut table = Table::new(&["ID", "DATASET", "AGENT", "TYPE", "STATUS", "PROGRESS", "STARTED"]);
    for run in runs {
        table.row([
            run.id.clone(),
            lookup.dataset(&run.dataset_id),
            lookup.agent(&run.agent_id),
            run.run_type.to_string(),
            run.status.to_string(),
            progress_cell(run.progress),
            optional_timestamp(run.started_at),
        ]);
    }
    table
}

async fn list(console: &Console, out: &mut dyn Write) -> Result<()> {
    let runs = console.client().list_test_runs().await?;
    if runs.is_empty() {
        writeln!(out, "No test runs yet.")?;
        return Ok(());
    }
    let lookup = Lookup::load(console).await?;
    write!(out, "{}", table(&runs, &lookup).render())?;
    Ok(())
}

async fn follow(console: &Console, tracked: BTreeSet<String>, out: &mut dyn Write) -> Result<()> {
    let lookup = Lookup::load(console).await?;
    let client = console.client.clone();
    let ids = tracked.clone();

    let fetch = move || {
        let client = client.clone();
        let ids = ids.clone();
        async move {
            let runs = client.list_test_runs().await?;
            Ok::<_, ClientApiError>(runs.into_iter().filter(|r| ids.contains(&r.id)).collect::<Vec<_>>())
        }
    };

    let mut waiting_reported = false;
    let mut failed = BTreeSet::new();
    watch::follow(console.config.polling_interval, fetch, out, |snapshot: &Snapshot<TestRun>, out| {
        if snapshot.records.is_empty() {
            if !waiting_reported {
                writeln!(out, "Waiting for runs: {}", join(&tracked))?;
                waiting_reported = true;
            }
            return Ok(());
        }
        for run in &snapshot.records {
            writeln!(
                out,
                "#{} {} {} {}",
                run.id,
                lookup.agent(&run.agent_id),
                progress_cell(run.progress),
                run.status
            )?;
            if run.status == JobStatus::Failed {
                failed.insert(run.id.clone());
            }
        }
        Ok(())
    })
    .await?;

    if !failed.is_empty() {
        bail!("test run failed: {}", join(&failed));
    }
    Ok(())
}

fn join(ids: &BTreeSet<String>) -> String {
    ids.iter().cloned().collect::<Vec<_>>().join(", ")
}
