//! Mock hub client backed by a local key-value store
//!
//! Every collection lives in one JSON slot of a [`KeyValueStore`]. Saves are
//! upserts by id, starts prepend a running record, and listing runs or jobs
//! applies one simulated progress tick before returning.

pub mod ids;
pub mod progress;
pub mod seed;
pub mod slots;

use async_trait::async_trait;
use avh_api_contract::*;
use avh_client_api::{ClientApi, ClientApiError, ClientApiResult};
use avh_local_db::{KeyValueStore, KeyValueStoreExt};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use validator::Validate;

pub use ids::IdGenerator;
pub use progress::{max_step, FixedProgress, ProgressStrategy, RandomProgress};

/// Default command a crawl is launched with when the request leaves it empty
pub fn default_crawl_command(source: &str) -> String {
    format!("python spider.py run --source {} --limit 100", source)
}

fn storage(err: avh_local_db::Error) -> ClientApiError {
    ClientApiError::Storage(err.to_string())
}

pub struct MockClient {
    store: Arc<dyn KeyValueStore>,
    strategy: Arc<dyn ProgressStrategy>,
    latency: Duration,
    ids: IdGenerator,
    // Serializes read-modify-write cycles issued through this client
    write_lock: Mutex<()>,
}

impl MockClient {
    /// Wrap `store`, seeding any slot that does not exist yet.
    pub fn new(store: Arc<dyn KeyValueStore>) -> ClientApiResult<Self> {
        let written = seed::seed_defaults(store.as_ref()).map_err(storage)?;
        if !written.is_empty() {
            tracing::debug!(slots = ?written, "seeded mock collections");
        }

        Ok(Self {
            store,
            strategy: Arc::new(RandomProgress),
            latency: Duration::ZERO,
            ids: IdGenerator::new(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ProgressStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn read<T: DeserializeOwned>(&self, slot: &str) -> ClientApiResult<Vec<T>> {
        self.store.read_json_or_default(slot).map_err(storage)
    }

    fn write<T: Serialize>(&self, slot: &str, rows: &[T]) -> ClientApiResult<()> {
        self.store.write_json(slot, rows).map_err(storage)
    }

    async fn list<T: DeserializeOwned>(&self, slot: &str) -> ClientApiResult<Vec<T>> {
        self.simulate_latency().await;
        self.read(slot)
    }

    async fn upsert<T>(&self, slot: &str, record: &T) -> ClientApiResult<T>
    where
        T: Record + Validate + Serialize + DeserializeOwned + Clone,
    {
        validation::validate(record)?;
        self.simulate_latency().await;

        let _guard = self.write_lock.lock().await;
        let mut rows: Vec<T> = self.read(slot)?;
        let existing = if record.id().is_empty() {
            None
        } else {
            rows.iter().position(|row| row.id() == record.id())
        };

        let stored = match existing {
            Some(index) => {
                rows[index] = record.clone();
                record.clone()
            }
            None => {
                let mut fresh = record.clone();
                fresh.assign_identity(self.ids.next_id(), Utc::now());
                rows.insert(0, fresh.clone());
                fresh
            }
        };
        self.write(slot, &rows)?;

        tracing::info!(slot, id = stored.id(), replaced = existing.is_some(), "saved record");
        Ok(stored)
    }

    async fn prepend<T: Serialize + DeserializeOwned>(&self, slot: &str, record: T) -> ClientApiResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows: Vec<T> = self.read(slot)?;
        rows.insert(0, record);
        self.write(slot, &rows)
    }

    /// Advance every running record in `slot` by one tick and persist the result.
    async fn tick<T>(&self, slot: &str) -> ClientApiResult<Vec<T>>
    where
        T: Trackable + Serialize + DeserializeOwned,
    {
        self.simulate_latency().await;

        let _guard = self.write_lock.lock().await;
        let mut rows: Vec<T> = self.read(slot)?;
        let now = Utc::now();
        let mut moved = 0usize;
        for row in rows.iter_mut() {
            if row.status() != JobStatus::Running {
                continue;
            }
            let step = self.strategy.advance(T::KIND);
            if row.advance(step, now) {
                moved += 1;
            }
        }
        if moved > 0 {
            self.write(slot, &rows)?;
            tracing::debug!(slot, moved, "advanced running records");
        }
        Ok(rows)
    }
}

#[async_trait]
impl ClientApi for MockClient {
    async fn list_datasets(&self) -> ClientApiResult<Vec<Dataset>> {
        self.list(slots::DATASETS).await
    }

    async fn save_dataset(&self, dataset: &Dataset) -> ClientApiResult<Dataset> {
        self.upsert(slots::DATASETS, dataset).await
    }

    async fn list_questions(&self, dataset_id: Option<&str>) -> ClientApiResult<Vec<Question>> {
        let mut questions: Vec<Question> = self.list(slots::QUESTIONS).await?;
        if let Some(dataset_id) = dataset_id {
            questions.retain(|q| q.dataset_id == dataset_id);
        }
        Ok(questions)
    }

    async fn save_question(&self, question: &Question) -> ClientApiResult<Question> {
        self.upsert(slots::QUESTIONS, question).await
    }

    async fn list_agents(&self) -> ClientApiResult<Vec<Agent>> {
        self.list(slots::AGENTS).await
    }

    async fn save_agent(&self, agent: &Agent) -> ClientApiResult<Agent> {
        self.upsert(slots::AGENTS, agent).await
    }

    async fn list_endpoints(&self) -> ClientApiResult<Vec<Endpoint>> {
        self.list(slots::ENDPOINTS).await
    }

    async fn save_endpoint(&self, endpoint: &Endpoint) -> ClientApiResult<Endpoint> {
        self.upsert(slots::ENDPOINTS, endpoint).await
    }

    async fn start_test_run(
        &self,
        request: &StartTestRunRequest,
    ) -> ClientApiResult<StartResponse> {
        validation::validate(request)?;
        self.simulate_latency().await;

        let agents: Vec<Agent> = self.read(slots::AGENTS)?;
        let run_type = agents
            .iter()
            .find(|a| a.id == request.agent_id)
            .map(|a| a.module)
            .unwrap_or_default();

        let id = self.ids.next_prefixed("run");
        let run = TestRun {
            id: id.clone(),
            dataset_id: request.dataset_id.clone(),
            agent_id: request.agent_id.clone(),
            run_type,
            params: JsonMap::new(),
            started_at: Some(Utc::now()),
            finished_at: None,
            status: JobStatus::Running,
            progress: Progress::new(1),
        };
        self.prepend(slots::TEST_RUNS, run).await?;

        tracing::info!(%id, dataset_id = %request.dataset_id, agent_id = %request.agent_id, "started test run");
        Ok(StartResponse { id })
    }

    async fn list_test_runs(&self) -> ClientApiResult<Vec<TestRun>> {
        self.tick(slots::TEST_RUNS).await
    }

    async fn list_results(&self) -> ClientApiResult<Vec<TestResult>> {
        self.list(slots::SIMPLE_RESULTS).await
    }

    async fn list_evaluations(&self, run_id: Option<&str>) -> ClientApiResult<Vec<Evaluation>> {
        let mut evaluations: Vec<Evaluation> = self.list(slots::EVALUATIONS).await?;
        if let Some(run_id) = run_id {
            evaluations.retain(|e| e.run_id == run_id);
        }
        Ok(evaluations)
    }

    async fn push_to_label_studio(
        &self,
        request: &LabelStudioPushRequest,
    ) -> ClientApiResult<PushResponse> {
        validation::validate(request)?;
        self.simulate_latency().await;
        tracing::info!(url = %request.url, dataset_id = ?request.dataset_id, run_id = ?request.run_id, "accepted label studio push");
        Ok(PushResponse { ok: true })
    }

    async fn list_spiders(&self) -> ClientApiResult<Vec<Spider>> {
        self.list(slots::SPIDERS).await
    }

    async fn save_spider(&self, spider: &Spider) -> ClientApiResult<Spider> {
        self.upsert(slots::SPIDERS, spider).await
    }

    async fn start_spider_job(
        &self,
        request: &StartSpiderJobRequest,
    ) -> ClientApiResult<StartResponse> {
        validation::validate(request)?;
        self.simulate_latency().await;

        let id = self.ids.next_prefixed("sj");
        let job = SpiderJob {
            id: id.clone(),
            spider_id: request.spider_id.clone(),
            status: JobStatus::Running,
            progress: Progress::new(1),
            stats: Some(JobStats::default()),
            started_at: Some(Utc::now()),
            finished_at: None,
            error: None,
        };
        self.prepend(slots::SPIDER_JOBS, job).await?;

        tracing::info!(%id, spider_id = %request.spider_id, "started spider job");
        Ok(StartResponse { id })
    }

    async fn list_spider_jobs(&self, spider_id: Option<&str>) -> ClientApiResult<Vec<SpiderJob>> {
        let mut jobs: Vec<SpiderJob> = self.tick(slots::SPIDER_JOBS).await?;
        if let Some(spider_id) = spider_id {
            jobs.retain(|j| j.spider_id == spider_id);
        }
        Ok(jobs)
    }

    async fn start_crawl(&self, request: &StartCrawlRequest) -> ClientApiResult<StartResponse> {
        validation::validate(request)?;
        self.simulate_latency().await;

        let command = if request.command.trim().is_empty() {
            default_crawl_command(&request.source)
        } else {
            request.command.clone()
        };

        let id = self.ids.next_prefixed("cj");
        let job = CrawlJob {
            id: id.clone(),
            source: request.source.clone(),
            command,
            status: JobStatus::Running,
            progress: Progress::new(1),
            stats: Some(JobStats::default()),
            started_at: Some(Utc::now()),
            finished_at: None,
            error: None,
        };
        self.prepend(slots::CRAWL_JOBS, job).await?;

        tracing::info!(%id, source = %request.source, "started crawl job");
        Ok(StartResponse { id })
    }

    async fn list_crawl_jobs(&self) -> ClientApiResult<Vec<CrawlJob>> {
        self.tick(slots::CRAWL_JOBS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avh_local_db::MemoryStore;

    #[test]
    fn test_default_crawl_command() {
        assert_eq!(
            default_crawl_command("guba"),
            "python spider.py run --source guba --limit 100"
        );
    }

    #[tokio::test]
    async fn test_new_seeds_every_slot() {
        let store = Arc::new(MemoryStore::new());
        MockClient::new(store.clone()).unwrap();
        for slot in slots::ALL {
            assert!(store.contains(slot).unwrap(), "{slot} was not seeded");
        }
    }
}
