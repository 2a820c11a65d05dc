//! Pool lifetime counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of pool counters since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Resources opened by the factory.
    pub resources_created: u64,
    /// Resources destroyed successfully, for any reason.
    pub resources_destroyed: u64,
    /// Resources removed by idle or lifetime expiry.
    pub resources_reaped: u64,
    /// Acquisitions that returned a resource.
    pub checkouts_successful: u64,
    /// Acquisitions that failed (exhaustion, creation failure, closed pool).
    pub checkouts_failed: u64,
    /// Factory `create` calls that failed.
    pub creation_failures: u64,
    /// Checkout validations that failed.
    pub validation_failures: u64,
    /// Factory `destroy` calls that failed.
    pub destroy_failures: u64,
    /// Releases handed directly to a queued waiter.
    pub handoffs: u64,
}

impl PoolMetrics {
    /// Fraction of acquisitions that succeeded, `1.0` when none were attempted.
    #[must_use]
    pub fn checkout_success_rate(&self) -> f64 {
        let total = self.checkouts_successful + self.checkouts_failed;
        if total == 0 {
            1.0
        } else {
            self.checkouts_successful as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) created: AtomicU64,
    pub(crate) destroyed: AtomicU64,
    pub(crate) reaped: AtomicU64,
    pub(crate) checkouts_successful: AtomicU64,
    pub(crate) checkouts_failed: AtomicU64,
    pub(crate) creation_failures: AtomicU64,
    pub(crate) validation_failures: AtomicU64,
    pub(crate) destroy_failures: AtomicU64,
    pub(crate) handoffs: AtomicU64,
}

impl Counters {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PoolMetrics {
        PoolMetrics {
            resources_created: self.created.load(Ordering::Relaxed),
            resources_destroyed: self.destroyed.load(Ordering::Relaxed),
            resources_reaped: self.reaped.load(Ordering::Relaxed),
            checkouts_successful: self.checkouts_successful.load(Ordering::Relaxed),
            checkouts_failed: self.checkouts_failed.load(Ordering::Relaxed),
            creation_failures: self.creation_failures.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            destroy_failures: self.destroy_failures.load(Ordering::Relaxed),
            handoffs: self.handoffs.load(Ordering::Relaxed),
        }
    }
}
