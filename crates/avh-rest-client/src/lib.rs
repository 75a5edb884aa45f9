//! REST API client for the Agent Validation Hub service
//!
//! Thin reqwest wrapper over the hub's JSON endpoints. Responses are decoded
//! straight into the contract types; job lists have their invariants
//! restored before they are handed out.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::*;
pub use client::*;
pub use error::*;

use async_trait::async_trait;
use avh_api_contract::*;
use avh_client_api::{ClientApi, ClientApiError, ClientApiResult};

impl From<RestClientError> for ClientApiError {
    fn from(err: RestClientError) -> Self {
        match err {
            RestClientError::Http(e) => ClientApiError::Transport(e.to_string()),
            RestClientError::ApiContract(e) => ClientApiError::Validation(e.to_string()),
            RestClientError::UnexpectedStatus { status, body } if status.as_u16() == 404 => {
                ClientApiError::NotFound(body)
            }
            other => ClientApiError::Server(other.to_string()),
        }
    }
}

#[async_trait]
impl ClientApi for client::RestClient {
    async fn list_datasets(&self) -> ClientApiResult<Vec<Dataset>> {
        Ok(self.list_datasets().await?)
    }

    async fn save_dataset(&self, dataset: &Dataset) -> ClientApiResult<Dataset> {
        Ok(self.save_dataset(dataset).await?)
    }

    async fn list_questions(&self, dataset_id: Option<&str>) -> ClientApiResult<Vec<Question>> {
        Ok(self.list_questions(dataset_id).await?)
    }

    async fn save_question(&self, question: &Question) -> ClientApiResult<Question> {
        Ok(self.save_question(question).await?)
    }

    async fn list_agents(&self) -> ClientApiResult<Vec<Agent>> {
        Ok(self.list_agents().await?)
    }

    async fn save_agent(&self, agent: &Agent) -> ClientApiResult<Agent> {
        Ok(self.save_agent(agent).await?)
    }

    async fn list_endpoints(&self) -> ClientApiResult<Vec<Endpoint>> {
        Ok(self.list_endpoints().await?)
    }

    async fn save_endpoint(&self, endpoint: &Endpoint) -> ClientApiResult<Endpoint> {
        Ok(self.save_endpoint(endpoint).await?)
    }

    async fn start_test_run(
        &self,
        request: &StartTestRunRequest,
    ) -> ClientApiResult<StartResponse> {
        Ok(self.start_test_run(request).await?)
    }

    async fn list_test_runs(&self) -> ClientApiResult<Vec<TestRun>> {
        Ok(self.list_test_runs().await?)
    }

    async fn list_results(&self) -> ClientApiResult<Vec<TestResult>> {
        Ok(self.list_results().await?)
    }

    async fn list_evaluations(&self, run_id: Option<&str>) -> ClientApiResult<Vec<Evaluation>> {
        Ok(self.list_evaluations(run_id).await?)
    }

    async fn push_to_label_studio(
        &self,
        request: &LabelStudioPushRequest,
    ) -> ClientApiResult<PushResponse> {
        Ok(self.push_to_label_studio(request).await?)
    }

    async fn list_spiders(&self) -> ClientApiResult<Vec<Spider>> {
        Ok(self.list_spiders().await?)
    }

    async fn save_spider(&self, spider: &Spider) -> ClientApiResult<Spider> {
        Ok(self.save_spider(spider).await?)
    }

    async fn start_spider_job(
        &self,
        request: &StartSpiderJobRequest,
    ) -> ClientApiResult<StartResponse> {
        Ok(self.start_spider_job(request).await?)
    }

    async fn list_spider_jobs(&self, spider_id: Option<&str>) -> ClientApiResult<Vec<SpiderJob>> {
        Ok(self.list_spider_jobs(spider_id).await?)
    }

    async fn start_crawl(&self, request: &StartCrawlRequest) -> ClientApiResult<StartResponse> {
        Ok(self.start_crawl(request).await?)
    }

    async fn list_crawl_jobs(&self) -> ClientApiResult<Vec<CrawlJob>> {
        Ok(self.list_crawl_jobs().await?)
    }
}
