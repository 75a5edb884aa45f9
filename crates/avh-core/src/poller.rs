//! Periodic refresh of tracked jobs and runs
//!
//! A [`Poller`] calls its fetch closure right away and then once per
//! interval, publishing every outcome as a [`Snapshot`] on a watch channel.
//! Failed fetches are logged and published without ending the loop.

use avh_api_contract::{all_settled, Trackable};
use avh_client_api::ClientApiResult;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Latest known state of a polled collection
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Records from the last successful fetch
    pub records: Vec<T>,
    /// Error of the most recent fetch, cleared by the next success
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
    /// Number of fetches completed so far, starting at 1
    pub sequence: u64,
}

impl<T: Trackable> Snapshot<T> {
    pub fn find(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Whether there is at least one record and none of them is still active.
    pub fn is_settled(&self) -> bool {
        !self.records.is_empty() && all_settled(&self.records)
    }
}

pub struct Poller {
    interval: Duration,
    stop_when_settled: bool,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            stop_when_settled: false,
            cancel: CancellationToken::new(),
        }
    }

    /// End the loop after the first snapshot in which every record is terminal.
    pub fn stop_when_settled(mut self, stop: bool) -> Self {
        self.stop_when_settled = stop;
        self
    }

    /// Stop the loop when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Start polling on the current runtime.
    pub fn spawn<T, F, Fut>(self, mut fetch: F) -> PollHandle<T>
    where
        T: Trackable + Clone + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ClientApiResult<Vec<T>>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel::<Option<Snapshot<T>>>(None);
        let cancel = self.cancel.clone();
        let interval = self.interval;
        let stop_when_settled = self.stop_when_settled;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut sequence = 0u64;
            let mut records: Vec<T> = Vec::new();

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = tokio::select! {
                    _ = cancel.cancelled() => break,
                    outcome = fetch() => outcome,
                };
                sequence += 1;

                let error = match outcome {
                    Ok(fresh) => {
                        records = fresh;
                        None
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, sequence, "poll failed");
                        Some(err.to_string())
                    }
                };

                let snapshot = Snapshot {
                    records: records.clone(),
                    error,
                    fetched_at: Utc::now(),
                    sequence,
                };
                let settled = snapshot.error.is_none() && snapshot.is_settled();
                sender.send_replace(Some(snapshot));

                if stop_when_settled && settled {
                    tracing::debug!(sequence, "all tracked records settled");
                    break;
                }
                if sender.is_closed() {
                    break;
                }
            }
        });

        PollHandle {
            receiver,
            cancel: self.cancel,
            task,
        }
    }
}

/// Handle to a running poll loop; dropping it does not stop the loop,
/// [`PollHandle::cancel`] does.
pub struct PollHandle<T> {
    receiver: watch::Receiver<Option<Snapshot<T>>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<T: Clone> PollHandle<T> {
    /// Wait for the next snapshot. Returns `None` once the loop has ended and
    /// every snapshot has been seen.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end.
    pub async fn join(self) {
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "poll task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avh_api_contract::{AgentModule, JobStatus, Progress, TestRun};
    use avh_client_api::ClientApiError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn run(progress: u8, status: JobStatus) -> TestRun {
        TestRun {
            id: "run_1".into(),
            dataset_id: "1".into(),
            agent_id: "11".into(),
            run_type: AgentModule::E2e,
            params: Default::default(),
            started_at: None,
            finished_at: None,
            status,
            progress: Progress::new(progress),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let mut handle = Poller::new(Duration::from_secs(3)).spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(vec![run(10, JobStatus::Running)]) }
        });

        let start = tokio::time::Instant::now();
        let first = handle.next().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);

        let second = handle.next().await.unwrap();
        assert_eq!(second.sequence, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        handle.cancel();
        handle.join().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_published_and_polling_continues() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let mut handle = Poller::new(Duration::from_millis(100)).spawn(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Ok(vec![run(10, JobStatus::Running)]),
                    1 => Err(ClientApiError::Transport("connection refused".into())),
                    _ => Ok(vec![run(30, JobStatus::Running)]),
                }
            }
        });

        let ok = handle.next().await.unwrap();
        assert!(ok.error.is_none());

        let failed = handle.next().await.unwrap();
        assert!(failed.error.as_deref().unwrap().contains("connection refused"));
        assert_eq!(failed.records[0].progress.percent(), 10);

        let recovered = handle.next().await.unwrap();
        assert!(recovered.error.is_none());
        assert_eq!(recovered.find("run_1").unwrap().progress.percent(), 30);

        handle.cancel();
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_settled_ends_the_loop() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let mut handle = Poller::new(Duration::from_millis(100))
            .stop_when_settled(true)
            .spawn(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    Ok(if n < 2 {
                        vec![run(50, JobStatus::Running)]
                    } else {
                        vec![run(100, JobStatus::Succeeded)]
                    })
                }
            });

        let mut last = None;
        while let Some(snapshot) = handle.next().await {
            last = Some(snapshot);
        }
        let last = last.unwrap();
        assert!(last.is_settled());
        assert_eq!(last.sequence, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_collection_is_not_settled() {
        let mut handle = Poller::new(Duration::from_millis(100))
            .stop_when_settled(true)
            .spawn(|| async { Ok(Vec::<TestRun>::new()) });

        handle.next().await.unwrap();
        handle.next().await.unwrap();
        assert!(!handle.is_finished());

        handle.cancel();
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancellation() {
        let token = CancellationToken::new();
        let mut handle = Poller::new(Duration::from_millis(100))
            .with_cancellation(token.clone())
            .spawn(|| async { Ok(vec![run(10, JobStatus::Running)]) });

        handle.next().await.unwrap();
        token.cancel();
        assert!(handle.next().await.is_none());
        assert!(handle.is_finished());
    }
}
