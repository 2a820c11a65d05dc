//! Pool core.
//!
//! All bookkeeping lives in one [`PoolState`] behind a single
//! `parking_lot::Mutex`. A capacity slot is always in exactly one of four
//! places: an idle entry, an in-use guard, a pending reservation (creation or
//! destruction in flight), or the retained list of resources whose
//! destruction failed. Their sum never exceeds `max_size`.
//!
//! Freed capacity is routed through [`PoolInner::dispatch`], which offers it
//! to the oldest live waiter before it becomes idle or free. A released
//! resource never reaches the idle set while someone is queued.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::factory::ResourceFactory;
use crate::lifecycle::{ResourceMetadata, ResourceState};
use crate::metrics::{Counters, PoolMetrics};
use crate::pooled::Pooled;

/// A bounded pool of resources produced by a [`ResourceFactory`].
///
/// `Pool` is a cheap handle; clones share the same pool. It is constructed
/// explicitly with [`Pool::new`] or [`Pool::builder`] and shut down with
/// [`Pool::close`].
pub struct Pool<F: ResourceFactory> {
    inner: Arc<PoolInner<F>>,
}

impl<F: ResourceFactory> Clone for Pool<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: ResourceFactory> fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<F: ResourceFactory> Pool<F> {
    /// Create a pool, validating `config`.
    ///
    /// When `config.reap_interval` is set and a tokio runtime is available,
    /// the idle reaper is started on it.
    pub fn new(factory: F, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let inner = Arc::new(PoolInner {
            factory,
            state: Mutex::new(PoolState::default()),
            counters: Counters::default(),
            next_id: AtomicU64::new(0),
            reaper: Mutex::new(None),
            shutdown: Arc::new(Notify::new()),
            config,
        });

        if let Some(interval) = inner.config.reap_interval {
            let handle = crate::reaper::spawn(&inner, interval);
            *inner.reaper.lock() = handle;
        }

        tracing::debug!(
            max_size = inner.config.max_size,
            idle_timeout = ?inner.config.idle_timeout,
            "resource pool created"
        );

        Ok(Self { inner })
    }

    /// Start building a pool around `factory`.
    pub fn builder(factory: F) -> PoolBuilder<F> {
        PoolBuilder {
            factory,
            config: PoolConfig::default(),
        }
    }

    /// Acquire a resource, waiting up to the configured `acquire_timeout`.
    pub async fn acquire(&self) -> Result<Pooled<F>, PoolError> {
        self.acquire_timeout(self.inner.config.acquire_timeout).await
    }

    /// Acquire a resource, waiting up to `timeout`.
    ///
    /// Returns an idle resource if one exists, otherwise creates one when
    /// below `max_size`, otherwise queues behind earlier waiters until a
    /// resource is released or `timeout` elapses. A zero timeout never waits.
    ///
    /// Dropping the returned future while queued leaves no reservation behind.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<Pooled<F>, PoolError> {
        tracing::trace!(?timeout, "acquiring resource from pool");

        let result = self.inner.acquire(timeout).await;
        match &result {
            Ok(pooled) => {
                Counters::incr(&self.inner.counters.checkouts_successful);
                tracing::trace!(id = pooled.metadata().id, "resource acquired");
            }
            Err(e) => {
                Counters::incr(&self.inner.counters.checkouts_failed);
                tracing::debug!(error = %e, "resource acquisition failed");
            }
        }
        result
    }

    /// Take an idle resource without waiting or creating.
    ///
    /// Returns `Ok(None)` when nothing is idle. Idle resources obtained this
    /// way are not validated.
    pub fn try_acquire(&self) -> Result<Option<Pooled<F>>, PoolError> {
        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        let Some(entry) = state.idle.pop_back() else {
            return Ok(None);
        };
        state.in_use += 1;
        drop(state);

        Counters::incr(&self.inner.counters.checkouts_successful);
        Ok(Some(Pooled::new(entry, Arc::clone(&self.inner))))
    }

    /// Return a resource to the pool.
    ///
    /// Equivalent to dropping the guard.
    pub fn release(&self, pooled: Pooled<F>) {
        drop(pooled);
    }

    /// Run one idle sweep now.
    ///
    /// Destroys every idle resource that has been idle for at least
    /// `idle_timeout` or has outlived `max_lifetime`, and retries resources
    /// whose destruction failed on an earlier sweep.
    pub async fn reap_idle(&self) -> crate::reaper::ReapReport {
        self.inner.reap().await
    }

    /// Counts for observability and tests.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats {
            idle_count: state.idle.len(),
            in_use_count: state.in_use,
            created_total: self.inner.counters.created.load(Ordering::Relaxed),
            waiting: state.live_waiters(),
            max_size: self.inner.config.max_size,
        }
    }

    /// Get the current pool status.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.inner.state.lock();
        PoolStatus {
            available: state.idle.len(),
            in_use: state.in_use,
            total: state.outstanding(),
            max: self.inner.config.max_size,
        }
    }

    /// Lifetime counters.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        self.inner.counters.snapshot()
    }

    /// Close the pool.
    ///
    /// Queued waiters and later acquisitions fail with [`PoolError::Closed`],
    /// the reaper stops, and idle resources are destroyed. Resources still
    /// checked out are destroyed when they are released.
    pub async fn close(&self) {
        let waiters = {
            let mut state = self.inner.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            std::mem::take(&mut state.waiters)
        };
        drop(waiters);

        // Let a sweep in progress finish destroying what it claimed.
        self.inner.shutdown.notify_one();
        let reaper = self.inner.reaper.lock().take();
        if let Some(reaper) = reaper {
            if let Err(e) = reaper.await {
                tracing::warn!(error = %e, "idle reaper did not stop cleanly");
            }
        }

        let doomed: Vec<_> = {
            let mut state = self.inner.state.lock();
            let idle = std::mem::take(&mut state.idle);
            let retained = std::mem::take(&mut state.retained);
            state.pending += idle.len() + retained.len();
            idle.into_iter().chain(retained).collect()
        };

        for mut entry in doomed {
            if entry.meta.state.is_available() {
                entry.meta.state = ResourceState::Discarded;
            }
            let reservation = Reservation::new(Arc::clone(&self.inner));
            self.inner.destroy_entry(entry, reservation).await;
        }

        tracing::info!("resource pool closed");
    }

    /// Check if the pool is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Get the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Get the resource factory.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.inner.factory
    }
}

/// Builder for [`Pool`].
#[derive(Debug)]
pub struct PoolBuilder<F> {
    factory: F,
    config: PoolConfig,
}

impl<F: ResourceFactory> PoolBuilder<F> {
    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum number of resources.
    #[must_use]
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = size;
        self
    }

    /// Set the default acquisition timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = timeout;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Set the maximum resource lifetime.
    #[must_use]
    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.config.max_lifetime = lifetime;
        self
    }

    /// Set the reaper period, or `None` to disable the background reaper.
    #[must_use]
    pub fn reap_interval(mut self, interval: Option<Duration>) -> Self {
        self.config.reap_interval = interval;
        self
    }

    /// Enable or disable validation on checkout.
    #[must_use]
    pub fn test_on_checkout(mut self, enabled: bool) -> Self {
        self.config.test_on_checkout = enabled;
        self
    }

    /// Build the pool.
    pub fn build(self) -> Result<Pool<F>, PoolError> {
        Pool::new(self.factory, self.config)
    }
}

/// Pool counts, as seen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources sitting in the idle set.
    pub idle_count: usize,
    /// Resources checked out.
    pub in_use_count: usize,
    /// Resources ever created by the factory.
    pub created_total: u64,
    /// Callers queued for a resource.
    pub waiting: usize,
    /// Configured maximum.
    pub max_size: usize,
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of idle resources available.
    pub available: usize,
    /// Number of resources currently in use.
    pub in_use: usize,
    /// Capacity slots taken, including creations and destructions in flight.
    pub total: usize,
    /// Maximum allowed resources.
    pub max: usize,
}

impl PoolStatus {
    /// Percentage of `max` currently checked out.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.in_use as f64 / self.max as f64 * 100.0
    }
}

pub(crate) struct Entry<R> {
    pub(crate) resource: R,
    pub(crate) meta: ResourceMetadata,
}

/// What a waiter can be handed: a live resource (its in-use slot comes with
/// it) or a bare slot to create into.
pub(crate) enum Grant<R> {
    Resource(Entry<R>),
    Permit,
}

pub(crate) struct PoolState<R> {
    /// Most recently released at the back.
    pub(crate) idle: VecDeque<Entry<R>>,
    pub(crate) in_use: usize,
    pub(crate) pending: usize,
    /// Resources whose destruction failed, retried by the reaper.
    pub(crate) retained: Vec<Entry<R>>,
    waiters: VecDeque<oneshot::Sender<Grant<R>>>,
    pub(crate) closed: bool,
}

impl<R> Default for PoolState<R> {
    fn default() -> Self {
        Self {
            idle: VecDeque::new(),
            in_use: 0,
            pending: 0,
            retained: Vec::new(),
            waiters: VecDeque::new(),
            closed: false,
        }
    }
}

impl<R> PoolState<R> {
    pub(crate) fn outstanding(&self) -> usize {
        self.idle.len() + self.in_use + self.pending + self.retained.len()
    }

    fn live_waiters(&self) -> usize {
        self.waiters.iter().filter(|tx| !tx.is_closed()).count()
    }
}

pub(crate) struct PoolInner<F: ResourceFactory> {
    pub(crate) factory: F,
    pub(crate) config: PoolConfig,
    pub(crate) state: Mutex<PoolState<F::Resource>>,
    pub(crate) counters: Counters,
    next_id: AtomicU64,
    reaper: Mutex<Option<JoinHandle<()>>>,
    pub(crate) shutdown: Arc<Notify>,
}

enum Claim<F: ResourceFactory> {
    Idle(Pooled<F>),
    Create(Reservation<F>),
    Wait(Waiter<F>),
}

impl<F: ResourceFactory> PoolInner<F> {
    async fn acquire(self: &Arc<Self>, timeout: Duration) -> Result<Pooled<F>, PoolError> {
        // `None` when the deadline is too far out to represent: wait forever.
        let deadline = Instant::now().checked_add(timeout);

        loop {
            match self.claim(timeout)? {
                Claim::Idle(mut pooled) => {
                    if !self.config.test_on_checkout {
                        return Ok(pooled);
                    }
                    match self.factory.validate(&mut *pooled).await {
                        Ok(()) => return Ok(pooled),
                        Err(e) => {
                            Counters::incr(&self.counters.validation_failures);
                            tracing::warn!(
                                id = pooled.metadata().id,
                                error = %e,
                                "idle resource failed validation, discarding"
                            );
                            pooled.evict(ResourceState::Discarded);
                        }
                    }
                }
                Claim::Create(reservation) => return self.create(reservation).await,
                Claim::Wait(mut waiter) => {
                    return match waiter.wait(deadline, timeout).await? {
                        Grant::Resource(entry) => Ok(Pooled::new(entry, Arc::clone(self))),
                        Grant::Permit => self.create(Reservation::new(Arc::clone(self))).await,
                    };
                }
            }
        }
    }

    fn claim(self: &Arc<Self>, timeout: Duration) -> Result<Claim<F>, PoolError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }

        if let Some(entry) = state.idle.pop_back() {
            state.in_use += 1;
            drop(state);
            return Ok(Claim::Idle(Pooled::new(entry, Arc::clone(self))));
        }

        if state.outstanding() < self.config.max_size {
            state.pending += 1;
            drop(state);
            return Ok(Claim::Create(Reservation::new(Arc::clone(self))));
        }

        if timeout.is_zero() {
            return Err(self.exhausted(timeout));
        }

        state.waiters.retain(|tx| !tx.is_closed());
        let (tx, rx) = oneshot::channel();
        state.waiters.push_back(tx);
        tracing::trace!(waiting = state.waiters.len(), "pool at capacity, queueing");
        drop(state);

        Ok(Claim::Wait(Waiter {
            rx,
            inner: Arc::clone(self),
            settled: false,
        }))
    }

    async fn create(self: &Arc<Self>, reservation: Reservation<F>) -> Result<Pooled<F>, PoolError> {
        match self.factory.create().await {
            Ok(resource) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                Counters::incr(&self.counters.created);
                tracing::debug!(id, "created resource");
                reservation.fulfil(Entry {
                    resource,
                    meta: ResourceMetadata::new(id),
                })
            }
            Err(e) => {
                Counters::incr(&self.counters.creation_failures);
                tracing::warn!(error = %e, "resource creation failed");
                drop(reservation);
                Err(PoolError::ResourceCreation(e.to_string()))
            }
        }
    }

    fn exhausted(&self, timeout: Duration) -> PoolError {
        PoolError::Exhausted {
            max_size: self.config.max_size,
            timeout,
        }
    }

    /// Route a freed slot: oldest live waiter first, otherwise back to the
    /// idle set (resources) or free capacity (permits).
    pub(crate) fn dispatch(
        self: &Arc<Self>,
        mut state: MutexGuard<'_, PoolState<F::Resource>>,
        mut grant: Grant<F::Resource>,
    ) {
        while let Some(tx) = state.waiters.pop_front() {
            let is_resource = matches!(grant, Grant::Resource(_));
            match tx.send(grant) {
                Ok(()) => {
                    if is_resource {
                        Counters::incr(&self.counters.handoffs);
                        tracing::trace!("resource handed to waiter");
                    }
                    return;
                }
                Err(returned) => grant = returned,
            }
        }

        match grant {
            Grant::Permit => state.pending -= 1,
            Grant::Resource(mut entry) => {
                state.in_use -= 1;
                if state.closed {
                    state.pending += 1;
                    drop(state);
                    entry.meta.state = ResourceState::Discarded;
                    self.spawn_destroy(entry, Reservation::new(Arc::clone(self)));
                } else {
                    entry.meta.mark_checkin(Instant::now());
                    state.idle.push_back(entry);
                }
            }
        }
    }

    /// Return a checked-out resource.
    pub(crate) fn checkin(self: &Arc<Self>, mut entry: Entry<F::Resource>) {
        let now = Instant::now();
        entry.meta.last_released_at = now;

        if entry.meta.is_expired(self.config.max_lifetime, now) {
            tracing::debug!(id = entry.meta.id, "resource reached max lifetime");
            entry.meta.state = ResourceState::Reaped;
            self.evict_in_use(entry);
            return;
        }

        tracing::trace!(id = entry.meta.id, "returning resource to pool");
        let state = self.state.lock();
        self.dispatch(state, Grant::Resource(entry));
    }

    /// Destroy a checked-out resource instead of returning it.
    pub(crate) fn evict_in_use(self: &Arc<Self>, entry: Entry<F::Resource>) {
        {
            let mut state = self.state.lock();
            state.in_use -= 1;
            state.pending += 1;
        }
        self.spawn_destroy(entry, Reservation::new(Arc::clone(self)));
    }

    /// Give up the in-use slot of a detached resource.
    pub(crate) fn forget_in_use(self: &Arc<Self>) {
        let mut state = self.state.lock();
        state.in_use -= 1;
        state.pending += 1;
        self.dispatch(state, Grant::Permit);
    }

    pub(crate) fn spawn_destroy(
        self: &Arc<Self>,
        entry: Entry<F::Resource>,
        reservation: Reservation<F>,
    ) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(self);
                handle.spawn(async move {
                    inner.destroy_entry(entry, reservation).await;
                });
            }
            Err(_) => {
                // No runtime to run the factory on; drop the resource in place.
                self.count_destroyed(&entry.meta);
                drop(entry);
                drop(reservation);
            }
        }
    }

    /// Destroy `entry`, freeing its slot on success or retaining it for the
    /// reaper on failure. Returns whether destruction succeeded.
    pub(crate) async fn destroy_entry(
        &self,
        entry: Entry<F::Resource>,
        reservation: Reservation<F>,
    ) -> bool {
        let Entry { resource, meta } = entry;
        match self.factory.destroy(resource).await {
            Ok(()) => {
                self.count_destroyed(&meta);
                tracing::debug!(id = meta.id, state = ?meta.state, "destroyed resource");
                drop(reservation);
                true
            }
            Err((resource, e)) => {
                Counters::incr(&self.counters.destroy_failures);
                tracing::warn!(id = meta.id, error = %e, "failed to destroy resource, retaining");
                reservation.retain(Entry { resource, meta });
                false
            }
        }
    }

    /// Expired resources count as reaped once, when their destruction
    /// actually succeeds.
    fn count_destroyed(&self, meta: &ResourceMetadata) {
        Counters::incr(&self.counters.destroyed);
        if meta.state == ResourceState::Reaped {
            Counters::incr(&self.counters.reaped);
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

/// One pending capacity slot. Dropping it frees the slot.
pub(crate) struct Reservation<F: ResourceFactory> {
    inner: Arc<PoolInner<F>>,
    armed: bool,
}

impl<F: ResourceFactory> Reservation<F> {
    /// Wrap a slot already counted in `pending`.
    pub(crate) fn new(inner: Arc<PoolInner<F>>) -> Self {
        Self { inner, armed: true }
    }

    /// Turn the slot into an in-use slot holding `entry`.
    fn fulfil(mut self, entry: Entry<F::Resource>) -> Result<Pooled<F>, PoolError> {
        let inner = Arc::clone(&self.inner);
        let mut state = inner.state.lock();
        if state.closed {
            drop(state);
            inner.spawn_destroy(entry, self);
            return Err(PoolError::Closed);
        }
        state.pending -= 1;
        state.in_use += 1;
        drop(state);

        self.armed = false;
        Ok(Pooled::new(entry, inner))
    }

    /// Keep the slot occupied by a resource that could not be destroyed.
    fn retain(mut self, entry: Entry<F::Resource>) {
        let mut state = self.inner.state.lock();
        state.pending -= 1;
        state.retained.push(entry);
        drop(state);
        self.armed = false;
    }
}

impl<F: ResourceFactory> Drop for Reservation<F> {
    fn drop(&mut self) {
        if self.armed {
            let state = self.inner.state.lock();
            self.inner.dispatch(state, Grant::Permit);
        }
    }
}

/// A queued acquisition. Dropping it before a grant is consumed hands the
/// grant on, so a timed-out or cancelled waiter never holds a slot.
struct Waiter<F: ResourceFactory> {
    rx: oneshot::Receiver<Grant<F::Resource>>,
    inner: Arc<PoolInner<F>>,
    settled: bool,
}

impl<F: ResourceFactory> Waiter<F> {
    async fn wait(
        &mut self,
        deadline: Option<Instant>,
        timeout: Duration,
    ) -> Result<Grant<F::Resource>, PoolError> {
        let received = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, &mut self.rx).await {
                Ok(received) => received,
                Err(_) => {
                    // A grant may have landed as the timer fired; take it.
                    self.rx.close();
                    match self.rx.try_recv() {
                        Ok(grant) => Ok(grant),
                        Err(_) => {
                            self.settled = true;
                            return Err(self.inner.exhausted(timeout));
                        }
                    }
                }
            },
            None => (&mut self.rx).await,
        };

        self.settled = true;
        received.map_err(|_| PoolError::Closed)
    }
}

impl<F: ResourceFactory> Drop for Waiter<F> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.rx.close();
        if let Ok(grant) = self.rx.try_recv() {
            tracing::trace!("waiter cancelled after grant, passing it on");
            let state = self.inner.state.lock();
            self.inner.dispatch(state, grant);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;

    #[derive(Default)]
    struct Counter {
        created: AtomicU32,
    }

    #[async_trait]
    impl ResourceFactory for Counter {
        type Resource = u32;
        type Error = std::convert::Infallible;

        async fn create(&self) -> Result<u32, Self::Error> {
            Ok(self.created.fetch_add(1, Ordering::Relaxed))
        }
    }

    fn pool(max_size: usize) -> Pool<Counter> {
        Pool::builder(Counter::default())
            .max_size(max_size)
            .reap_interval(None)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_acquire_creates_then_reuses() {
        let pool = pool(2);

        let first = pool.acquire().await.unwrap();
        let id = first.metadata().id;
        drop(first);

        let again = pool.acquire().await.unwrap();
        assert_eq!(again.metadata().id, id);
        assert_eq!(again.metadata().checkout_count, 2);
        assert_eq!(pool.stats().created_total, 1);
    }

    #[tokio::test]
    async fn test_zero_timeout_at_capacity_fails_fast() {
        let pool = pool(1);
        let _held = pool.acquire().await.unwrap();

        let err = pool.acquire_timeout(Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, PoolError::Exhausted { max_size: 1, .. }));
        assert_eq!(pool.stats().waiting, 0);
    }

    #[tokio::test]
    async fn test_try_acquire_only_takes_idle() {
        let pool = pool(2);
        assert!(pool.try_acquire().unwrap().is_none());

        drop(pool.acquire().await.unwrap());
        let idle = pool.try_acquire().unwrap();
        assert!(idle.is_some());
        assert_eq!(pool.stats().in_use_count, 1);
    }

    #[tokio::test]
    async fn test_most_recently_released_is_reused_first() {
        let pool = pool(2);
        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        let b_id = b.metadata().id;
        drop(a);
        drop(b);

        let next = pool.acquire().await.unwrap();
        assert_eq!(next.metadata().id, b_id);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let pool = pool(4);
        let a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
        drop(a);

        let status = pool.status();
        assert_eq!(status.available, 1);
        assert_eq!(status.in_use, 1);
        assert_eq!(status.total, 2);
        assert_eq!(status.max, 4);
        assert!((status.utilization() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Pool::builder(Counter::default()).max_size(0).build();
        assert!(matches!(result, Err(PoolError::Configuration(_))));
    }

    #[test]
    fn test_release_without_runtime() {
        let pool = Pool::builder(Counter::default())
            .max_size(1)
            .reap_interval(None)
            .build()
            .unwrap();

        let pooled = tokio_test::block_on(pool.acquire()).unwrap();
        pool.release(pooled);
        assert_eq!(pool.stats().idle_count, 1);
    }
}
