//! Main REST API client implementation

use avh_api_contract::*;
use chrono::Utc;
use reqwest::{Client as HttpClient, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::auth::AuthMethod;
use crate::error::{RestClientError, RestClientResult};

/// REST API client for the hub service
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthMethod,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(base_url: Url, auth: AuthMethod) -> RestClientResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("avh/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            auth,
        })
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str, auth: AuthMethod) -> RestClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        Self::new(base_url, auth)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthMethod {
        &self.auth
    }

    pub async fn list_datasets(&self) -> RestClientResult<Vec<Dataset>> {
        self.get("/api/datasets", &[]).await
    }

    pub async fn save_dataset(&self, dataset: &Dataset) -> RestClientResult<Dataset> {
        self.post("/api/datasets/save", dataset).await
    }

    pub async fn list_questions(&self, dataset_id: Option<&str>) -> RestClientResult<Vec<Question>> {
        self.get("/api/questions", &[("dataset_id", dataset_id)]).await
    }

    pub async fn save_question(&self, question: &Question) -> RestClientResult<Question> {
        self.post("/api/questions/save", question).await
    }

    pub async fn list_agents(&self) -> RestClientResult<Vec<Agent>> {
        self.get("/api/agents", &[]).await
    }

    pub async fn save_agent(&self, agent: &Agent) -> RestClientResult<Agent> {
        self.post("/api/agents/save", agent).await
    }

    pub async fn list_endpoints(&self) -> RestClientResult<Vec<Endpoint>> {
        self.get("/api/endpoints", &[]).await
    }

    pub async fn save_endpoint(&self, endpoint: &Endpoint) -> RestClientResult<Endpoint> {
        self.post("/api/endpoints/save", endpoint).await
    }

    pub async fn start_test_run(
        &self,
        request: &StartTestRunRequest,
    ) -> RestClientResult<StartResponse> {
        validation::validate(request)?;
        self.post("/api/tests/start", request).await
    }

    pub async fn list_test_runs(&self) -> RestClientResult<Vec<TestRun>> {
        let runs = self.get("/api/tests/runs", &[]).await?;
        Ok(settled(runs))
    }

    /// Simplified results shown by the results view
    pub async fn list_results(&self) -> RestClientResult<Vec<TestResult>> {
        self.get("/api/results/simple", &[]).await
    }

    pub async fn list_evaluations(&self, run_id: Option<&str>) -> RestClientResult<Vec<Evaluation>> {
        self.get("/api/results", &[("run_id", run_id)]).await
    }

    pub async fn push_to_label_studio(
        &self,
        request: &LabelStudioPushRequest,
    ) -> RestClientResult<PushResponse> {
        self.post("/api/labelstudio/push", request).await
    }

    pub async fn list_spiders(&self) -> RestClientResult<Vec<Spider>> {
        self.get("/api/spiders", &[]).await
    }

    pub async fn save_spider(&self, spider: &Spider) -> RestClientResult<Spider> {
        self.post("/api/spiders/save", spider).await
    }

    pub async fn start_spider_job(
        &self,
        request: &StartSpiderJobRequest,
    ) -> RestClientResult<StartResponse> {
        validation::validate(request)?;
        self.post("/api/spiders/start", request).await
    }

    pub async fn list_spider_jobs(&self, spider_id: Option<&str>) -> RestClientResult<Vec<SpiderJob>> {
        let jobs = self.get("/api/spiders/jobs", &[("spider_id", spider_id)]).await?;
        Ok(settled(jobs))
    }

    pub async fn start_crawl(&self, request: &StartCrawlRequest) -> RestClientResult<StartResponse> {
        validation::validate(request)?;
        self.post("/api/crawler/start", request).await
    }

    pub async fn list_crawl_jobs(&self) -> RestClientResult<Vec<CrawlJob>> {
        let jobs = self.get("/api/crawler/jobs", &[]).await?;
        Ok(settled(jobs))
    }

    // Private helper methods

    /// Resolve `path` below the base URL, keeping any path prefix of the base.
    pub(crate) fn endpoint(&self, path: &str, query: &[(&str, Option<&str>)]) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(None);

        let present: Vec<_> = query
            .iter()
            .filter_map(|(key, value)| value.map(|v| (*key, v)))
            .collect();
        if !present.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in present {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, Option<&str>)],
    ) -> RestClientResult<T> {
        let url = self.endpoint(path, query);
        self.request(Method::GET, url, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RestClientResult<T> {
        let url = self.endpoint(path, &[]);
        self.request(Method::POST, url, Some(body)).await
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> RestClientResult<T> {
        tracing::debug!(%method, %url, "hub request");

        let mut request = self.http_client.request(method, url).headers(self.auth.headers()?);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> RestClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(RestClientError::from)
        } else {
            tracing::debug!(%status, body = %text, "hub request failed");
            match serde_json::from_str::<ProblemDetails>(&text) {
                Ok(problem) => Err(RestClientError::ServerError {
                    status,
                    details: problem,
                }),
                Err(_) => Err(RestClientError::UnexpectedStatus { status, body: text }),
            }
        }
    }
}

/// Apply record invariants to job lists reported by the server.
fn settled<T: Trackable>(mut records: Vec<T>) -> Vec<T> {
    let now = Utc::now();
    for record in &mut records {
        record.settle(now);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RestClient::from_url("http://localhost:8000", AuthMethod::default()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RestClient::from_url("not a url", AuthMethod::None),
            Err(RestClientError::Url(_))
        ));
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = RestClient::from_url("https://hub.example/console/", AuthMethod::None).unwrap();
        let url = client.endpoint("/api/datasets", &[]);
        assert_eq!(url.as_str(), "https://hub.example/console/api/datasets");
    }

    #[test]
    fn test_endpoint_query_skips_missing_values() {
        let client = RestClient::from_url("http://localhost:8000", AuthMethod::None).unwrap();

        let url = client.endpoint("/api/questions", &[("dataset_id", None)]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/questions");

        let url = client.endpoint("/api/questions", &[("dataset_id", Some("1 2"))]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/questions?dataset_id=1+2");
    }

    #[test]
    fn test_settled_fixes_server_jobs() {
        let job = SpiderJob {
            id: "sj_1".into(),
            spider_id: "301".into(),
            status: JobStatus::Succeeded,
            progress: Progress::new(60),
            stats: None,
            started_at: None,
            finished_at: None,
            error: None,
        };
        let jobs = settled(vec![job]);
        assert_eq!(jobs[0].progress, Progress::COMPLETE);
    }
}
