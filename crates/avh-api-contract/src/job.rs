//! Lifecycle shared by tracked jobs and runs

use crate::progress::Progress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Job/run lifecycle states
///
/// Backends report `queued` and `completed` for some resource kinds; those are
/// accepted as aliases of `pending` and `succeeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[serde(alias = "queued")]
    Pending,
    Running,
    #[serde(alias = "completed")]
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Running => 1,
            JobStatus::Succeeded | JobStatus::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotone.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self == next {
            return true;
        }
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of tracked work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    TestRun,
    SpiderJob,
    CrawlJob,
}

/// Free-form job counters as reported by crawlers
///
/// Different runners name the same counter differently, so the accessors
/// resolve a list of aliases and treat a missing counter as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobStats(pub BTreeMap<String, serde_json::Value>);

impl JobStats {
    pub const CRAWLED: &'static [&'static str] = &["crawled", "fetch_count", "crawl"];
    pub const STORED: &'static [&'static str] = &["stored", "saved"];
    pub const FAILED: &'static [&'static str] = &["failed", "error"];

    pub fn crawled(&self) -> u64 {
        self.counter(Self::CRAWLED)
    }

    pub fn stored(&self) -> u64 {
        self.counter(Self::STORED)
    }

    pub fn failed(&self) -> u64 {
        self.counter(Self::FAILED)
    }

    /// First alias that holds an unsigned number.
    pub fn counter(&self, aliases: &[&str]) -> u64 {
        aliases
            .iter()
            .find_map(|key| self.0.get(*key).and_then(serde_json::Value::as_u64))
            .unwrap_or(0)
    }

    /// Increase the counter held by the first numeric alias. When no alias
    /// holds a number the first alias is created.
    pub fn bump(&mut self, aliases: &[&str], by: u64) {
        let Some(first) = aliases.first() else {
            return;
        };
        let (key, current) = aliases
            .iter()
            .find_map(|key| self.0.get(*key).and_then(serde_json::Value::as_u64).map(|n| (*key, n)))
            .unwrap_or((*first, 0));
        self.0.insert(key.to_string(), serde_json::Value::from(current.saturating_add(by)));
    }
}

/// Mutable view over the lifecycle fields of a tracked record
pub struct JobStateMut<'a> {
    pub status: &'a mut JobStatus,
    pub progress: &'a mut Progress,
    pub finished_at: &'a mut Option<DateTime<Utc>>,
    pub stats: Option<&'a mut JobStats>,
}

/// A record whose progress is tracked by polling
pub trait Trackable {
    const KIND: JobKind;

    fn id(&self) -> &str;
    fn status(&self) -> JobStatus;
    fn progress(&self) -> Progress;
    fn started_at(&self) -> Option<DateTime<Utc>>;
    fn finished_at(&self) -> Option<DateTime<Utc>>;
    fn error(&self) -> Option<&str> {
        None
    }
    fn stats(&self) -> Option<&JobStats> {
        None
    }
    fn state_mut(&mut self) -> JobStateMut<'_>;

    /// Apply one simulated tick.
    ///
    /// Only running records move. Progress grows by at least one point and is
    /// clipped to 100; reaching 100 flips the status to succeeded and stamps
    /// the finish time. Returns whether the record changed.
    fn advance(&mut self, step: u8, now: DateTime<Utc>) -> bool {
        let state = self.state_mut();
        if *state.status != JobStatus::Running {
            return false;
        }
        let step = step.max(1);
        let next = state.progress.saturating_add(step);
        let gained = u64::from(next.percent() - state.progress.percent());
        *state.progress = next;
        if let Some(stats) = state.stats {
            stats.bump(JobStats::CRAWLED, gained);
            stats.bump(JobStats::STORED, gained);
        }
        if next.is_complete() {
            *state.status = JobStatus::Succeeded;
            *state.finished_at = Some(now);
        }
        true
    }

    /// Restore the record invariants after decoding foreign data: a
    /// succeeded record always reports full progress, and a record at full
    /// progress that is still running is finished.
    fn settle(&mut self, now: DateTime<Utc>) {
        let state = self.state_mut();
        if *state.status == JobStatus::Succeeded {
            *state.progress = Progress::COMPLETE;
        } else if *state.status == JobStatus::Running && state.progress.is_complete() {
            *state.status = JobStatus::Succeeded;
            if state.finished_at.is_none() {
                *state.finished_at = Some(now);
            }
        }
    }
}

/// Whether every record has reached a terminal state
pub fn all_settled<T: Trackable>(records: &[T]) -> bool {
    records.iter().all(|r| r.status().is_terminal())
}

/// A saveable record keyed by id
pub trait Record {
    fn id(&self) -> &str;

    /// Give a new record its identity when it is first stored.
    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SpiderJob, TestRun};
    use crate::AgentModule;

    fn running_run(progress: u8) -> TestRun {
        TestRun {
            id: "run_1".into(),
            dataset_id: "1".into(),
            agent_id: "11".into(),
            run_type: AgentModule::E2e,
            params: Default::default(),
            started_at: Some(Utc::now()),
            finished_at: None,
            status: JobStatus::Running,
            progress: Progress::new(progress),
        }
    }

    #[test]
    fn test_status_aliases() {
        let s: JobStatus = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(s, JobStatus::Pending);
        let s: JobStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, JobStatus::Succeeded);
        assert_eq!(serde_json::to_string(&JobStatus::Succeeded).unwrap(), "\"succeeded\"");
    }

    #[test]
    fn test_transitions_are_monotone() {
        use JobStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Failed));
        assert!(Running.can_transition_to(Succeeded));
        assert!(Running.can_transition_to(Running));
        assert!(!Running.can_transition_to(Pending));
        assert!(!Succeeded.can_transition_to(Running));
        assert!(!Succeeded.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Succeeded));
    }

    #[test]
    fn test_advance_moves_only_running_records() {
        let now = Utc::now();
        let mut run = running_run(10);
        assert!(run.advance(5, now));
        assert_eq!(run.progress.percent(), 15);
        assert_eq!(run.status, JobStatus::Running);

        let mut pending = running_run(0);
        pending.status = JobStatus::Pending;
        assert!(!pending.advance(5, now));
        assert_eq!(pending.progress, Progress::ZERO);
    }

    #[test]
    fn test_advance_to_complete_finishes_in_the_same_tick() {
        let now = Utc::now();
        let mut run = running_run(90);
        run.advance(20, now);
        assert_eq!(run.progress, Progress::COMPLETE);
        assert_eq!(run.status, JobStatus::Succeeded);
        assert_eq!(run.finished_at, Some(now));
        assert!(!run.advance(20, now));
    }

    #[test]
    fn test_zero_step_still_makes_progress() {
        let mut run = running_run(3);
        run.advance(0, Utc::now());
        assert_eq!(run.progress.percent(), 4);
    }

    #[test]
    fn test_settle_enforces_success_implies_complete() {
        let now = Utc::now();
        let mut run = running_run(40);
        run.status = JobStatus::Succeeded;
        run.settle(now);
        assert_eq!(run.progress, Progress::COMPLETE);

        let mut run = running_run(100);
        run.settle(now);
        assert_eq!(run.status, JobStatus::Succeeded);
        assert_eq!(run.finished_at, Some(now));
    }

    #[test]
    fn test_stats_aliases_and_bump() {
        let mut stats: JobStats =
            serde_json::from_str(r#"{"fetch_count": 7, "saved": 3, "error": 1}"#).unwrap();
        assert_eq!(stats.crawled(), 7);
        assert_eq!(stats.stored(), 3);
        assert_eq!(stats.failed(), 1);

        stats.bump(JobStats::CRAWLED, 2);
        assert_eq!(stats.crawled(), 9);
        assert!(!stats.0.contains_key("crawled"));

        let mut empty = JobStats::default();
        empty.bump(JobStats::STORED, 4);
        assert_eq!(empty.0.get("stored"), Some(&serde_json::json!(4)));
        assert_eq!(empty.failed(), 0);
    }

    #[test]
    fn test_spider_job_advance_updates_counters() {
        let mut job = SpiderJob {
            id: "sj_1".into(),
            spider_id: "301".into(),
            status: JobStatus::Running,
            progress: Progress::new(95),
            stats: None,
            started_at: Some(Utc::now()),
            finished_at: None,
            error: None,
        };
        job.advance(15, Utc::now());
        let stats = job.stats.as_ref().unwrap();
        assert_eq!(stats.crawled(), 5);
        assert_eq!(stats.stored(), 5);
        assert_eq!(job.status, JobStatus::Succeeded);
    }

    #[test]
    fn test_advance_grows_aliased_counters() {
        let mut job = SpiderJob {
            id: "sj_2".into(),
            spider_id: "301".into(),
            status: JobStatus::Running,
            progress: Progress::new(40),
            stats: Some(serde_json::from_str(r#"{"fetch_count": 40, "saved": 30}"#).unwrap()),
            started_at: Some(Utc::now()),
            finished_at: None,
            error: None,
        };
        job.advance(5, Utc::now());
        let stats = job.stats.as_ref().unwrap();
        assert_eq!(stats.crawled(), 45);
        assert_eq!(stats.stored(), 35);
        assert_eq!(stats.0.len(), 2);
    }
}
