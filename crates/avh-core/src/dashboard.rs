//! Dashboard summary

use crate::Result;
use avh_api_contract::{JobStatus, TestRun};
use avh_client_api::ClientApi;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub running_runs: Vec<TestRun>,
    pub dataset_count: usize,
    pub agent_count: usize,
}

impl DashboardSummary {
    pub async fn load(client: &dyn ClientApi) -> Result<Self> {
        let runs = client.list_test_runs().await?;
        let datasets = client.list_datasets().await?;
        let agents = client.list_agents().await?;

        Ok(Self {
            running_runs: runs
                .into_iter()
                .filter(|r| r.status == JobStatus::Running)
                .collect(),
            dataset_count: datasets.len(),
            agent_count: agents.len(),
        })
    }
}
