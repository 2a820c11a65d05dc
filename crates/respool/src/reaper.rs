//! Idle reaper.
//!
//! A sweep claims expired idle resources under the pool lock, which is the
//! same lock `acquire` claims through, so a resource is either taken by a
//! caller or by the sweep, never both. Claimed resources keep their capacity
//! slot as a pending reservation until their destruction finishes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::factory::ResourceFactory;
use crate::lifecycle::ResourceState;
use crate::pool::{Entry, PoolInner, Reservation};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapReport {
    /// Resources destroyed by this sweep.
    pub reaped: usize,
    /// Destructions that failed during this sweep.
    pub failed: usize,
    /// Resources awaiting a destruction retry after this sweep.
    pub retained: usize,
}

/// Start the periodic reaper for `inner`.
///
/// The task only holds a weak reference and stops once the pool is dropped
/// or closed. Closing signals it between sweeps, so a sweep in progress always
/// finishes destroying what it claimed. Returns `None` when called outside a
/// tokio runtime.
pub(crate) fn spawn<F: ResourceFactory>(
    inner: &Arc<PoolInner<F>>,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("no tokio runtime, idle reaper not started");
        return None;
    };
    let pool = Arc::downgrade(inner);
    let shutdown = Arc::clone(&inner.shutdown);

    Some(handle.spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = shutdown.notified() => break,
            }
            let Some(inner) = pool.upgrade() else {
                break;
            };
            if inner.is_closed() {
                break;
            }
            let report = inner.reap().await;
            if report.reaped > 0 || report.failed > 0 {
                tracing::debug!(
                    reaped = report.reaped,
                    failed = report.failed,
                    retained = report.retained,
                    "idle sweep"
                );
            }
        }

        tracing::trace!("idle reaper stopped");
    }))
}

impl<F: ResourceFactory> PoolInner<F> {
    pub(crate) async fn reap(self: &Arc<Self>) -> ReapReport {
        let now = Instant::now();
        let idle_timeout = self.config.idle_timeout;
        let max_lifetime = self.config.max_lifetime;

        let doomed: Vec<(Entry<F::Resource>, Reservation<F>)> = {
            let mut state = self.state.lock();
            let (expired, keep): (VecDeque<_>, VecDeque<_>) =
                std::mem::take(&mut state.idle).into_iter().partition(|entry| {
                    entry.meta.is_idle_expired(idle_timeout, now)
                        || entry.meta.is_expired(max_lifetime, now)
                });
            state.idle = keep;
            let retried = std::mem::take(&mut state.retained);
            state.pending += expired.len() + retried.len();
            drop(state);

            // Retried entries keep the state they were first evicted with.
            expired
                .into_iter()
                .map(|mut entry| {
                    entry.meta.state = ResourceState::Reaped;
                    entry
                })
                .chain(retried)
                .map(|entry| (entry, Reservation::new(Arc::clone(self))))
                .collect()
        };

        let mut report = ReapReport::default();
        for (entry, reservation) in doomed {
            tracing::trace!(id = entry.meta.id, "reaping resource");
            if self.destroy_entry(entry, reservation).await {
                report.reaped += 1;
            } else {
                report.failed += 1;
            }
        }

        report.retained = self.state.lock().retained.len();
        report
    }
}
