//! Dataset and question views

use anyhow::{bail, Result};
use avh_api_contract::{Dataset, JsonMap, Question, TaskKind};
use chrono::Utc;
use clap::{Args, Subcommand};
use std::io::Write;

use crate::page::Page;
use crate::render::{or_dash, parse_json_map, timestamp, Table};
use crate::Console;

#[derive(Subcommand)]
pub enum DatasetCommands {
    /// List every dataset
    List,
    /// Create a dataset, or edit the one named by --id
    Save(DatasetSaveArgs),
}

#[derive(Args)]
pub struct DatasetSaveArgs {
    /// Id of the dataset to edit
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// intent, ner, t2sql, e2e or mixed
    #[arg(long = "task-type", value_name = "KIND")]
    pub task_type: Option<TaskKind>,

    #[arg(long)]
    pub description: Option<String>,
}

impl DatasetCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Datasets.header(out)?;
        match self {
            DatasetCommands::List => list_datasets(console, out).await,
            DatasetCommands::Save(args) => args.run(console, out).await,
        }
    }
}

async fn list_datasets(console: &Console, out: &mut dyn Write) -> Result<()> {
    let datasets = console.client().list_datasets().await?;
    if datasets.is_empty() {
        writeln!(out, "No datasets yet.")?;
        return Ok(());
    }

    let mut table = Table::new(&["ID", "NAME", "TYPE", "DESCRIPTION", "CREATED"]);
    for ds in &datasets {
        table.row([
            ds.id.clone(),
            ds.name.clone(),
            ds.task_type.to_string(),
            or_dash(ds.description.as_deref()),
            timestamp(ds.created_at),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

impl DatasetSaveArgs {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        let existing = match &self.id {
            Some(id) => console
                .client()
                .list_datasets()
                .await?
                .into_iter()
                .find(|d| &d.id == id),
            None => None,
        };

        let dataset = match existing {
            Some(mut ds) => {
                if let Some(name) = self.name {
                    ds.name = name;
                }
                if let Some(kind) = self.task_type {
                    ds.task_type = kind;
                }
                if self.description.is_some() {
                    ds.description = self.description;
                }
                ds
            }
            None => {
                let (Some(name), Some(task_type)) = (self.name, self.task_type) else {
                    bail!("a new dataset needs --name and --task-type");
                };
                Dataset {
                    id: self.id.unwrap_or_default(),
                    name,
                    task_type,
                    description: self.description,
                    created_at: Utc::now(),
                }
            }
        };

        let saved = console.client().save_dataset(&dataset).await?;
        writeln!(out, "Saved dataset {} ({})", saved.id, saved.name)?;
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum QuestionCommands {
    /// List questions, optionally only those of one dataset
    List {
        #[arg(long = "dataset", value_name = "ID")]
        dataset: Option<String>,
    },
    /// Create a question, or edit the one named by --id
    Save(QuestionSaveArgs),
}

#[derive(Args)]
pub struct QuestionSaveArgs {
    /// Id of the question to edit
    #[arg(long)]
    pub id: Option<String>,

    /// Dataset the question belongs to
    #[arg(long = "dataset", value_name = "ID")]
    pub dataset: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long = "source-type")]
    pub source_type: Option<String>,

    #[arg(long = "source-remark")]
    pub source_remark: Option<String>,

    #[arg(long)]
    pub difficulty: Option<i16>,

    /// Extra attributes as a JSON object
    #[arg(long, value_name = "JSON")]
    pub meta: Option<String>,
}

impl QuestionCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Questions.header(out)?;
        match self {
            QuestionCommands::List { dataset } => list_questions(console, dataset.as_deref(), out).await,
            QuestionCommands::Save(args) => args.run(console, out).await,
        }
    }
}

async fn list_questions(console: &Console, dataset_id: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let questions = console.client().list_questions(dataset_id).await?;
    if questions.is_empty() {
        writeln!(out, "No questions found.")?;
        return Ok(());
    }

    let datasets = console.client().list_datasets().await?;
    let dataset_name = |id: &str| {
        datasets
            .iter()
            .find(|d| d.id == id)
            .map_or_else(|| id.to_string(), |d| d.name.clone())
    };

    let mut table = Table::new(&["ID", "DATASET", "CONTENT", "CATEGORY", "DIFFICULTY", "CREATED"]);
    for q in &questions {
        table.row([
            q.id.clone(),
            dataset_name(&q.dataset_id),
            q.content.clone(),
            or_dash(q.category.as_deref()),
            q.difficulty.map_or_else(|| "-".to_string(), |d| d.to_string()),
            timestamp(q.created_at),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

impl QuestionSaveArgs {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        let meta = self.meta.as_deref().map(parse_json_map).transpose()?;

        let existing = match &self.id {
            Some(id) => console
                .client()
                .list_questions(None)
                .await?
                .into_iter()
                .find(|q| &q.id == id),
            None => None,
        };

        let question = match existing {
            Some(mut q) => {
                if let Some(dataset) = self.dataset {
                    q.dataset_id = dataset;
                }
                if let Some(content) = self.content {
                    q.content = content;
                }
                if self.category.is_some() {
                    q.category = self.category;
                }
                if self.source_type.is_some() {
                    q.source_type = self.source_type;
                }
                if self.source_remark.is_some() {
                    q.source_remark = self.source_remark;
                }
                if self.difficulty.is_some() {
                    q.difficulty = self.difficulty;
                }
                if let Some(meta) = meta {
                    q.meta = meta;
                }
                q
            }
            None => {
                let (Some(dataset_id), Some(content)) = (self.dataset, self.content) else {
                    bail!("a new question needs --dataset and --content");
                };
                Question {
                    id: self.id.unwrap_or_default(),
                    dataset_id,
                    content,
                    category: self.category,
                    source_type: self.source_type,
                    source_remark: self.source_remark,
                    difficulty: self.difficulty,
                    meta: meta.unwrap_or_else(JsonMap::new),
                    created_at: Utc::now(),
                }
            }
        };

        let saved = console.client().save_question(&question).await?;
        writeln!(out, "Saved question {} in dataset {}", saved.id, saved.dataset_id)?;
        Ok(())
    }
}
