//! Dashboard summary of datasets, agents and running tests

use anyhow::Result;
use avh_core::DashboardSummary;
use std::io::Write;

use crate::page::Page;
use crate::render::{progress_cell, Table};
use crate::Console;

pub async fn run(console: &Console, out: &mut dyn Write) -> Result<()> {
    Page::Dashboard.header(out)?;

    let summary = DashboardSummary::load(console.client()).await?;
    writeln!(out, "Running tests:    {}", summary.running_runs.len())?;
    writeln!(out, "Datasets:         {}", summary.dataset_count)?;
    writeln!(out, "Available agents: {}", summary.agent_count)?;

    if !summary.running_runs.is_empty() {
        writeln!(out)?;
        writeln!(out, "In progress")?;
        let mut table = Table::new(&["RUN", "PROGRESS"]);
        for run in &summary.running_runs {
            table.row([format!("#{}", run.id), progress_cell(run.progress)]);
        }
        write!(out, "{}", table.render())?;
    }
    Ok(())
}
