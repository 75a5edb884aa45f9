//! Slot names the mock keeps its collections under

pub const DATASETS: &str = "ia_datasets";
pub const QUESTIONS: &str = "ia_questions";
pub const AGENTS: &str = "ia_agents";
pub const ENDPOINTS: &str = "ia_endpoints";
pub const TEST_RUNS: &str = "ia_test_runs";
pub const EVALUATIONS: &str = "ia_evaluations";
pub const SIMPLE_RESULTS: &str = "avh_results";
pub const SPIDERS: &str = "ia_spiders";
pub const SPIDER_JOBS: &str = "ia_spider_jobs";
pub const CRAWL_JOBS: &str = "ia_crawl_jobs";

/// Every collection slot, in seeding order
pub const ALL: [&str; 10] = [
    DATASETS,
    QUESTIONS,
    AGENTS,
    ENDPOINTS,
    TEST_RUNS,
    EVALUATIONS,
    SIMPLE_RESULTS,
    SPIDERS,
    SPIDER_JOBS,
    CRAWL_JOBS,
];
