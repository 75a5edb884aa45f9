//! Test results and evaluation views

use anyhow::Result;
use clap::Subcommand;
use std::io::Write;

use crate::page::Page;
use crate::render::{timestamp, Table};
use crate::Console;

#[derive(Subcommand)]
pub enum ResultCommands {
    /// List stored test results
    List,
    /// List evaluation metrics, optionally only those of one run
    Evaluations {
        #[arg(long = "run", value_name = "ID")]
        run: Option<String>,
    },
}

impl ResultCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Results.header(out)?;
        match self {
            ResultCommands::List => list_results(console, out).await,
            ResultCommands::Evaluations { run } => list_evaluations(console, run.as_deref(), out).await,
        }
    }
}

async fn list_results(console: &Console, out: &mut dyn Write) -> Result<()> {
    let results = console.client().list_results().await?;
    if results.is_empty() {
        writeln!(out, "No test results yet.")?;
        return Ok(());
    }

    let mut table = Table::new(&["ID", "RUN", "INPUT", "OUTPUT", "SCORE", "CREATED"]);
    for result in &results {
        table.row([
            result.id.clone(),
            result.run_id.clone(),
            result.input.clone(),
            result.output.clone(),
            result.score.map_or_else(|| "-".to_string(), |s| format!("{:.2}", s)),
            timestamp(result.created_at),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

async fn list_evaluations(console: &Console, run_id: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let evaluations = console.client().list_evaluations(run_id).await?;
    if evaluations.is_empty() {
        writeln!(out, "No evaluations found.")?;
        return Ok(());
    }

    let mut table = Table::new(&["ID", "RUN", "QUESTION", "METRIC", "VALUE", "PASS"]);
    for eval in &evaluations {
        let pass = match eval.pass {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        table.row([
            eval.id.clone(),
            eval.run_id.clone(),
            eval.question_id.clone(),
            eval.metric.clone(),
            format!("{:.3}", eval.value),
            pass.to_string(),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}
