//! Timestamp-derived identifiers

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out unix-millisecond ids that never repeat within one generator,
/// even when several records are created in the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_millis(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    pub fn next_id(&self) -> String {
        self.next_millis().to_string()
    }

    pub fn next_prefixed(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let ids = IdGenerator::new();
        let mut previous = ids.next_millis();
        for _ in 0..1000 {
            let next = ids.next_millis();
            assert!(next > previous);
            previous = next;
        }
        assert!(ids.next_prefixed("run").starts_with("run_"));
    }
}
