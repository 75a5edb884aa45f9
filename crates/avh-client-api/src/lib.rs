//! Client API trait for the Agent Validation Hub
//!
//! Views talk to one `ClientApi` chosen at startup: the REST client in remote
//! mode or the locally persisted mock. Every list operation returns the full
//! collection, every save is an upsert by id, and every start returns the id
//! of a freshly created running record.

use async_trait::async_trait;
use avh_api_contract::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientApiError {
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl From<ApiContractError> for ClientApiError {
    fn from(err: ApiContractError) -> Self {
        ClientApiError::Validation(err.to_string())
    }
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[async_trait]
pub trait ClientApi: Send + Sync {
    async fn list_datasets(&self) -> ClientApiResult<Vec<Dataset>>;
    async fn save_dataset(&self, dataset: &Dataset) -> ClientApiResult<Dataset>;

    async fn list_questions(&self, dataset_id: Option<&str>) -> ClientApiResult<Vec<Question>>;
    async fn save_question(&self, question: &Question) -> ClientApiResult<Question>;

    async fn list_agents(&self) -> ClientApiResult<Vec<Agent>>;
    async fn save_agent(&self, agent: &Agent) -> ClientApiResult<Agent>;

    async fn list_endpoints(&self) -> ClientApiResult<Vec<Endpoint>>;
    async fn save_endpoint(&self, endpoint: &Endpoint) -> ClientApiResult<Endpoint>;

    async fn start_test_run(&self, request: &StartTestRunRequest)
        -> ClientApiResult<StartResponse>;
    async fn list_test_runs(&self) -> ClientApiResult<Vec<TestRun>>;

    async fn list_results(&self) -> ClientApiResult<Vec<TestResult>>;
    async fn list_evaluations(&self, run_id: Option<&str>) -> ClientApiResult<Vec<Evaluation>>;

    async fn push_to_label_studio(
        &self,
        request: &LabelStudioPushRequest,
    ) -> ClientApiResult<PushResponse>;

    async fn list_spiders(&self) -> ClientApiResult<Vec<Spider>>;
    async fn save_spider(&self, spider: &Spider) -> ClientApiResult<Spider>;
    async fn start_spider_job(
        &self,
        request: &StartSpiderJobRequest,
    ) -> ClientApiResult<StartResponse>;
    async fn list_spider_jobs(&self, spider_id: Option<&str>) -> ClientApiResult<Vec<SpiderJob>>;

    async fn start_crawl(&self, request: &StartCrawlRequest) -> ClientApiResult<StartResponse>;
    async fn list_crawl_jobs(&self) -> ClientApiResult<Vec<CrawlJob>>;
}
