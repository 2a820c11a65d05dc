//! Test fixture utilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use respool::{Pool, PoolStats, ResourceFactory};

/// Highest counts observed across a series of [`PoolStats`] samples.
///
/// Safe to share between tasks.
#[derive(Debug, Default)]
pub struct Watermark {
    in_use: AtomicUsize,
    occupied: AtomicUsize,
    samples: AtomicUsize,
}

impl Watermark {
    /// Create an empty watermark.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample.
    pub fn record(&self, stats: &PoolStats) {
        self.in_use.fetch_max(stats.in_use_count, Ordering::Relaxed);
        self.occupied
            .fetch_max(stats.idle_count + stats.in_use_count, Ordering::Relaxed);
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Highest `in_use_count` seen.
    #[must_use]
    pub fn max_in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Highest `idle_count + in_use_count` seen.
    #[must_use]
    pub fn max_occupied(&self) -> usize {
        self.occupied.load(Ordering::Relaxed)
    }

    /// Number of samples recorded.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples.load(Ordering::Relaxed)
    }
}

/// Poll until `pool` reports exactly `n` queued callers.
///
/// Returns `false` if that does not happen within `limit`.
pub async fn wait_for_waiters<F: ResourceFactory>(pool: &Pool<F>, n: usize, limit: Duration) -> bool {
    let poll = async {
        while pool.stats().waiting != n {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    };
    tokio::time::timeout(limit, poll).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(idle_count: usize, in_use_count: usize) -> PoolStats {
        PoolStats {
            idle_count,
            in_use_count,
            created_total: 0,
            waiting: 0,
            max_size: 10,
        }
    }

    #[test]
    fn test_watermark_keeps_maximum() {
        let mark = Watermark::new();
        mark.record(&stats(0, 3));
        mark.record(&stats(4, 1));
        mark.record(&stats(1, 2));

        assert_eq!(mark.max_in_use(), 3);
        assert_eq!(mark.max_occupied(), 5);
        assert_eq!(mark.samples(), 3);
    }
}
