//! Running log of one tracked job

use avh_api_contract::{JobStatus, Progress, Trackable};
use chrono::NaiveTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    status: JobStatus,
    progress: Progress,
    crawled: u64,
    stored: u64,
    failed: u64,
}

impl Observation {
    fn of<T: Trackable>(record: &T) -> Self {
        let stats = record.stats();
        Self {
            status: record.status(),
            progress: record.progress(),
            crawled: stats.map_or(0, |s| s.crawled()),
            stored: stats.map_or(0, |s| s.stored()),
            failed: stats.map_or(0, |s| s.failed()),
        }
    }
}

/// Appends a line each time a followed job reports something new.
#[derive(Debug, Clone)]
pub struct JobLog {
    job_id: String,
    lines: Vec<String>,
    last: Option<Observation>,
}

impl JobLog {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            lines: Vec::new(),
            last: None,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Record that the job was started from this view.
    pub fn started(&mut self, at: NaiveTime) -> &str {
        self.push(at, format!("started job {}", self.job_id))
    }

    /// Compare `record` with the previous observation and log it when any
    /// displayed value changed. Records of other jobs are ignored.
    pub fn observe<T: Trackable>(&mut self, record: &T, at: NaiveTime) -> Option<&str> {
        if record.id() != self.job_id {
            return None;
        }
        let current = Observation::of(record);
        if self.last == Some(current) {
            return None;
        }
        self.last = Some(current);

        let line = format!(
            "status:{} progress:{}% crawled:{} stored:{} failed:{}",
            current.status,
            current.progress.percent(),
            current.crawled,
            current.stored,
            current.failed
        );
        Some(self.push(at, line))
    }

    fn push(&mut self, at: NaiveTime, message: String) -> &str {
        self.lines.push(format!("[{}] {}", at.format("%H:%M:%S"), message));
        self.lines.last().map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avh_api_contract::{JobStats, SpiderJob};

    fn job(progress: u8, crawled: u64) -> SpiderJob {
        let mut stats = JobStats::default();
        stats.bump(JobStats::CRAWLED, crawled);
        stats.bump(JobStats::STORED, crawled);
        SpiderJob {
            id: "sj_1".into(),
            spider_id: "301".into(),
            status: JobStatus::Running,
            progress: Progress::new(progress),
            stats: Some(stats),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_lines_only_on_change() {
        let mut log = JobLog::new("sj_1");
        assert_eq!(log.started(at(9, 5, 0)), "[09:05:00] started job sj_1");

        assert_eq!(
            log.observe(&job(1, 0), at(9, 5, 1)),
            Some("[09:05:01] status:running progress:1% crawled:0 stored:0 failed:0")
        );
        assert_eq!(log.observe(&job(1, 0), at(9, 5, 4)), None);
        assert!(log.observe(&job(12, 11), at(9, 5, 7)).is_some());

        let mut done = job(100, 99);
        done.status = JobStatus::Succeeded;
        assert_eq!(
            log.observe(&done, at(9, 5, 10)),
            Some("[09:05:10] status:succeeded progress:100% crawled:99 stored:99 failed:0")
        );
        assert_eq!(log.lines().len(), 4);
    }

    #[test]
    fn test_other_jobs_are_ignored() {
        let mut log = JobLog::new("sj_2");
        assert_eq!(log.observe(&job(50, 3), at(0, 0, 0)), None);
        assert!(log.lines().is_empty());
    }
}
