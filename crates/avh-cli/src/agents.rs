//! Agent and endpoint views

use anyhow::{bail, Result};
use avh_api_contract::{Agent, AgentModule, Endpoint, EndpointKind, JsonMap};
use chrono::Utc;
use clap::{Args, Subcommand};
use std::io::Write;

use crate::page::Page;
use crate::render::{json_cell, or_dash, parse_json_map, Table};
use crate::Console;

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List every agent
    List,
    /// Register an agent, or edit the one named by --id
    Save(AgentSaveArgs),
}

#[derive(Args)]
pub struct AgentSaveArgs {
    /// Id of the agent to edit
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// intent, ner, t2sql or e2e
    #[arg(long, value_name = "MODULE")]
    pub module: Option<AgentModule>,

    #[arg(long)]
    pub version: Option<String>,

    #[arg(long = "model-name")]
    pub model_name: Option<String>,

    #[arg(long = "prompt-hash")]
    pub prompt_hash: Option<String>,

    #[arg(long = "code-commit")]
    pub code_commit: Option<String>,

    /// Base URL of the agent's API
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// API key of the agent's API
    #[arg(long = "agent-api-key", value_name = "KEY")]
    pub agent_api_key: Option<String>,

    /// Extra configuration as a JSON object
    #[arg(long, value_name = "JSON")]
    pub config: Option<String>,
}

impl AgentCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Agents.header(out)?;
        match self {
            AgentCommands::List => list_agents(console, out).await,
            AgentCommands::Save(args) => args.run(console, out).await,
        }
    }
}

async fn list_agents(console: &Console, out: &mut dyn Write) -> Result<()> {
    let agents = console.client().list_agents().await?;
    if agents.is_empty() {
        writeln!(out, "No agents registered.")?;
        return Ok(());
    }

    let mut table = Table::new(&["ID", "NAME", "MODULE", "VERSION", "MODEL", "BASE URL", "API KEY"]);
    for agent in &agents {
        let key = match agent.api_key.as_deref() {
            Some(k) if !k.is_empty() => "set",
            _ => "-",
        };
        table.row([
            agent.id.clone(),
            agent.name.clone(),
            agent.module.to_string(),
            agent.version.clone(),
            or_dash(agent.model_name.as_deref()),
            or_dash(agent.base_url.as_deref()),
            key.to_string(),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

impl AgentSaveArgs {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        let config = self.config.as_deref().map(parse_json_map).transpose()?;

        let existing = match &self.id {
            Some(id) => console
                .client()
                .list_agents()
                .await?
                .into_iter()
                .find(|a| &a.id == id),
            None => None,
        };

        let agent = match existing {
            Some(mut agent) => {
                if let Some(name) = self.name {
                    agent.name = name;
                }
                if let Some(module) = self.module {
                    agent.module = module;
                }
                if let Some(version) = self.version {
                    agent.version = version;
                }
                if self.model_name.is_some() {
                    agent.model_name = self.model_name;
                }
                if self.prompt_hash.is_some() {
                    agent.prompt_hash = self.prompt_hash;
                }
                if self.code_commit.is_some() {
                    agent.code_commit = self.code_commit;
                }
                if self.base_url.is_some() {
                    agent.base_url = self.base_url;
                }
                if self.agent_api_key.is_some() {
                    agent.api_key = self.agent_api_key;
                }
                if let Some(config) = config {
                    agent.config = config;
                }
                agent
            }
            None => {
                let (Some(name), Some(version)) = (self.name, self.version) else {
                    bail!("a new agent needs --name and --version");
                };
                Agent {
                    id: self.id.unwrap_or_default(),
                    name,
                    module: self.module.unwrap_or_default(),
                    version,
                    model_name: self.model_name,
                    prompt_hash: self.prompt_hash,
                    code_commit: self.code_commit,
                    base_url: self.base_url,
                    api_key: self.agent_api_key,
                    config: config.unwrap_or_else(JsonMap::new),
                    created_at: Utc::now(),
                }
            }
        };

        let saved = console.client().save_agent(&agent).await?;
        writeln!(out, "Saved agent {} ({})", saved.id, saved.name)?;
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum EndpointCommands {
    /// List every endpoint
    List,
    /// Register an endpoint, or edit the one named by --id
    Save(EndpointSaveArgs),
}

#[derive(Args)]
pub struct EndpointSaveArgs {
    /// Id of the endpoint to edit
    #[arg(long)]
    pub id: Option<String>,

    /// dify, gemini, openai or http
    #[arg(long, value_name = "KIND")]
    pub kind: Option<EndpointKind>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Credentials as a JSON object
    #[arg(long, value_name = "JSON")]
    pub auth: Option<String>,

    /// Default request parameters as a JSON object
    #[arg(long = "params", value_name = "JSON")]
    pub default_params: Option<String>,
}

impl EndpointCommands {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        Page::Endpoints.header(out)?;
        match self {
            EndpointCommands::List => list_endpoints(console, out).await,
            EndpointCommands::Save(args) => args.run(console, out).await,
        }
    }
}

async fn list_endpoints(console: &Console, out: &mut dyn Write) -> Result<()> {
    let endpoints = console.client().list_endpoints().await?;
    if endpoints.is_empty() {
        writeln!(out, "No endpoints registered.")?;
        return Ok(());
    }

    let mut table = Table::new(&["ID", "KIND", "NAME", "BASE URL", "PARAMS"]);
    for ep in &endpoints {
        table.row([
            ep.id.clone(),
            ep.kind.to_string(),
            ep.name.clone(),
            or_dash(ep.base_url.as_deref()),
            json_cell(&ep.default_params),
        ]);
    }
    write!(out, "{}", table.render())?;
    Ok(())
}

impl EndpointSaveArgs {
    pub async fn run(self, console: &Console, out: &mut dyn Write) -> Result<()> {
        let auth = self.auth.as_deref().map(parse_json_map).transpose()?;
        let default_params = self.default_params.as_deref().map(parse_json_map).transpose()?;

        let existing = match &self.id {
            Some(id) => console
                .client()
                .list_endpoints()
                .await?
                .into_iter()
                .find(|e| &e.id == id),
            None => None,
        };

        let endpoint = match existing {
            Some(mut ep) => {
                if let Some(kind) = self.kind {
                    ep.kind = kind;
                }
                if let Some(name) = self.name {
                    ep.name = name;
                }
                if self.base_url.is_some() {
                    ep.base_url = self.base_url;
                }
                if let Some(auth) = auth {
                    ep.auth = auth;
                }
                if let Some(params) = default_params {
                    ep.default_params = params;
                }
                ep
            }
            None => {
                let (Some(kind), Some(name)) = (self.kind, self.name) else {
                    bail!("a new endpoint needs --kind and --name");
                };
                Endpoint {
                    id: self.id.unwrap_or_default(),
                    kind,
                    name,
                    base_url: self.base_url,
                    auth: auth.unwrap_or_else(JsonMap::new),
                    default_params: default_params.unwrap_or_else(JsonMap::new),
                    created_at: Utc::now(),
                }
            }
        };

        let saved = console.client().save_endpoint(&endpoint).await?;
        writeln!(out, "Saved endpoint {} ({})", saved.id, saved.name)?;
        Ok(())
    }
}
