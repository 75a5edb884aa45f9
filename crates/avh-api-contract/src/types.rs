//! API contract types for the Agent Validation Hub REST service

use crate::error::ApiContractError;
use crate::job::{JobKind, JobStateMut, JobStats, JobStatus, Record, Trackable};
use crate::progress::Progress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Free-form JSON object attached to several resources
pub type JsonMap = BTreeMap<String, serde_json::Value>;

/// Resource ids arrive as strings or integers; both decode to a `String`.
mod id {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}

/// Task kinds a dataset can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Intent,
    Ner,
    T2sql,
    E2e,
    Mixed,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Intent,
        TaskKind::Ner,
        TaskKind::T2sql,
        TaskKind::E2e,
        TaskKind::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Intent => "intent",
            TaskKind::Ner => "ner",
            TaskKind::T2sql => "t2sql",
            TaskKind::E2e => "e2e",
            TaskKind::Mixed => "mixed",
        }
    }

    /// The agent module evaluating this kind, if it is a single-module kind.
    pub fn as_module(self) -> Option<AgentModule> {
        match self {
            TaskKind::Intent => Some(AgentModule::Intent),
            TaskKind::Ner => Some(AgentModule::Ner),
            TaskKind::T2sql => Some(AgentModule::T2sql),
            TaskKind::E2e => Some(AgentModule::E2e),
            TaskKind::Mixed => None,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ApiContractError::InvalidTaskKind(s.to_string()))
    }
}

/// Module an agent implements (a task kind other than `mixed`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentModule {
    Intent,
    Ner,
    T2sql,
    #[default]
    E2e,
}

impl AgentModule {
    pub const ALL: [AgentModule; 4] = [
        AgentModule::Intent,
        AgentModule::Ner,
        AgentModule::T2sql,
        AgentModule::E2e,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentModule::Intent => "intent",
            AgentModule::Ner => "ner",
            AgentModule::T2sql => "t2sql",
            AgentModule::E2e => "e2e",
        }
    }
}

impl fmt::Display for AgentModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentModule {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentModule::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ApiContractError::InvalidAgentModule(s.to_string()))
    }
}

/// LLM/agent endpoint providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Dify,
    Gemini,
    Openai,
    Http,
}

impl EndpointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::Dify => "dify",
            EndpointKind::Gemini => "gemini",
            EndpointKind::Openai => "openai",
            EndpointKind::Http => "http",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointKind {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            EndpointKind::Dify,
            EndpointKind::Gemini,
            EndpointKind::Openai,
            EndpointKind::Http,
        ]
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| ApiContractError::InvalidEndpointKind(s.to_string()))
    }
}

/// Test dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Dataset {
    #[serde(default, deserialize_with = "id::deserialize")]
    pub id: String,
    #[validate(length(min = 1, message = "Dataset name cannot be empty"))]
    pub name: String,
    pub task_type: TaskKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Question belonging to a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Question {
    #[serde(default, deserialize_with = "id::deserialize")]
    pub id: String,
    #[validate(length(min = 1, message = "Question must belong to a dataset"))]
    #[serde(deserialize_with = "id::deserialize")]
    pub dataset_id: String,
    #[validate(length(min = 1, message = "Question content cannot be empty"))]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i16>,
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub meta: JsonMap,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Agent under evaluation
///
/// The API key is kept in plaintext alongside the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Agent {
    #[serde(default, deserialize_with = "id::deserialize")]
    pub id: String,
    #[validate(length(min = 1, message = "Agent name cannot be empty"))]
    pub name: String,
    pub module: AgentModule,
    #[validate(length(min = 1, message = "Agent version cannot be empty"))]
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub config: JsonMap,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// LLM or HTTP endpoint an agent talks to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Endpoint {
    #[serde(default, deserialize_with = "id::deserialize")]
    pub id: String,
    pub kind: EndpointKind,
    #[validate(length(min = 1, message = "Endpoint name cannot be empty"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub auth: JsonMap,
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub default_params: JsonMap,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Registered crawl source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Spider {
    #[serde(default, deserialize_with = "id::deserialize")]
    pub id: String,
    #[validate(length(min = 1, message = "Spider name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Spider target cannot be empty"))]
    pub target: String,
    pub runner: String,
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub config: JsonMap,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// One execution of a registered spider; progress is a fraction or a percentage on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiderJob {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub spider_id: String,
    pub status: JobStatus,
    #[serde(with = "crate::progress::auto", default)]
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stats: Option<JobStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Crawler job launched from a preset; progress is a fraction on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlJob {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub command: String,
    pub status: JobStatus,
    #[serde(with = "crate::progress::fraction", default)]
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stats: Option<JobStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Test run of an agent against a dataset; progress is a percentage on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub dataset_id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub agent_id: String,
    pub run_type: AgentModule,
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub params: JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Progress,
}

/// Simplified result row shown by the results view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub run_id: String,
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Metric computed for one question of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub run_id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub question_id: String,
    pub metric: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<bool>,
    #[serde(skip_serializing_if = "JsonMap::is_empty", default)]
    pub details: JsonMap,
}

/// Request body for `POST /api/tests/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StartTestRunRequest {
    #[validate(length(min = 1, message = "A dataset must be selected"))]
    pub dataset_id: String,
    #[validate(length(min = 1, message = "An agent must be selected"))]
    pub agent_id: String,
}

/// Request body for `POST /api/spiders/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StartSpiderJobRequest {
    #[validate(length(min = 1, message = "A spider must be selected"))]
    pub spider_id: String,
}

/// Request body for `POST /api/crawler/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StartCrawlRequest {
    #[validate(length(min = 1, message = "A crawler source must be selected"))]
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spider_id: Option<String>,
    #[serde(default)]
    pub command: String,
}

/// Response of every start operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
}

/// Request body for `POST /api/labelstudio/push`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LabelStudioPushRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[validate(length(min = 1, message = "LabelStudio URL cannot be empty"))]
    pub url: String,
    pub token: String,
}

/// Response of `POST /api/labelstudio/push`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    pub ok: bool,
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
                    self.id = id;
                    self.created_at = created_at;
                }
            }
        )*
    };
}

impl_record!(Dataset, Question, Agent, Endpoint, Spider);

impl Trackable for TestRun {
    const KIND: JobKind = JobKind::TestRun;

    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Progress {
        self.progress
    }
    fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
    fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
    fn state_mut(&mut self) -> JobStateMut<'_> {
        JobStateMut {
            status: &mut self.status,
            progress: &mut self.progress,
            finished_at: &mut self.finished_at,
            stats: None,
        }
    }
}

impl Trackable for SpiderJob {
    const KIND: JobKind = JobKind::SpiderJob;

    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Progress {
        self.progress
    }
    fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
    fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn stats(&self) -> Option<&JobStats> {
        self.stats.as_ref()
    }
    fn state_mut(&mut self) -> JobStateMut<'_> {
        JobStateMut {
            status: &mut self.status,
            progress: &mut self.progress,
            finished_at: &mut self.finished_at,
            stats: Some(self.stats.get_or_insert_with(JobStats::default)),
        }
    }
}

impl Trackable for CrawlJob {
    const KIND: JobKind = JobKind::CrawlJob;

    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Progress {
        self.progress
    }
    fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
    fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn stats(&self) -> Option<&JobStats> {
        self.stats.as_ref()
    }
    fn state_mut(&mut self) -> JobStateMut<'_> {
        JobStateMut {
            status: &mut self.status,
            progress: &mut self.progress,
            finished_at: &mut self.finished_at,
            stats: Some(self.stats.get_or_insert_with(JobStats::default)),
        }
    }
}
