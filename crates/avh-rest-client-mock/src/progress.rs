//! Simulated progress increments

use avh_api_contract::JobKind;
use rand::Rng;

/// Decides how far a running record moves on one tick
pub trait ProgressStrategy: Send + Sync {
    /// Percentage points to add; values below 1 are treated as 1.
    fn advance(&self, kind: JobKind) -> u8;
}

/// Largest step a single tick may apply to a kind of work
pub fn max_step(kind: JobKind) -> u8 {
    match kind {
        JobKind::TestRun => 20,
        JobKind::SpiderJob | JobKind::CrawlJob => 15,
    }
}

/// Uniform step in `1..=max_step(kind)`
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomProgress;

impl ProgressStrategy for RandomProgress {
    fn advance(&self, kind: JobKind) -> u8 {
        rand::thread_rng().gen_range(1..=max_step(kind))
    }
}

/// Same step on every tick
#[derive(Debug, Clone, Copy)]
pub struct FixedProgress(pub u8);

impl ProgressStrategy for FixedProgress {
    fn advance(&self, _kind: JobKind) -> u8 {
        self.0
    }
}
