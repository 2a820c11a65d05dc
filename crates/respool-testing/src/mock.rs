//! Mock resource factory.
//!
//! [`MockFactory`] opens in-memory [`MockConnection`]s and keeps a live count
//! of connections that have been created and not yet destroyed, the same
//! number a database would report as its active sessions. Failures of each
//! factory operation can be scripted ahead of time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use respool::ResourceFactory;
use thiserror::Error;

/// Error type for mock factory operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MockError {
    /// Scripted creation failure.
    #[error("connection refused")]
    Refused,

    /// Scripted validation failure.
    #[error("connection broken")]
    Broken,

    /// Scripted destruction failure.
    #[error("close failed")]
    CloseFailed,
}

/// An in-memory stand-in for a database connection.
#[derive(Debug)]
pub struct MockConnection {
    /// Factory-assigned identifier, starting at 1.
    pub id: u64,
    /// Number of queries run on this connection.
    pub queries: u64,
}

impl MockConnection {
    /// Simulate a round trip.
    pub async fn query(&mut self) -> u64 {
        tokio::task::yield_now().await;
        self.queries += 1;
        self.queries
    }
}

#[derive(Debug, Default)]
struct MockState {
    next_id: AtomicU64,
    created: AtomicU64,
    destroyed: AtomicU64,
    validations: AtomicU64,
    fail_creates: AtomicU32,
    fail_validations: AtomicU32,
    fail_destroys: AtomicU32,
}

/// A [`ResourceFactory`] producing [`MockConnection`]s.
///
/// Clones share counters, so a test can keep one clone and hand the other to
/// the pool.
#[derive(Debug, Clone, Default)]
pub struct MockFactory {
    state: Arc<MockState>,
    create_delay: Duration,
    destroy_delay: Duration,
}

impl MockFactory {
    /// Create a factory with no latency and no scripted failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create` take `delay`.
    #[must_use]
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// Make every `destroy` take `delay`.
    #[must_use]
    pub fn with_destroy_delay(mut self, delay: Duration) -> Self {
        self.destroy_delay = delay;
        self
    }

    /// Fail the next `n` creations.
    pub fn fail_next_creates(&self, n: u32) {
        self.state.fail_creates.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` validations.
    pub fn fail_next_validations(&self, n: u32) {
        self.state.fail_validations.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` destructions.
    pub fn fail_next_destroys(&self, n: u32) {
        self.state.fail_destroys.store(n, Ordering::SeqCst);
    }

    /// Connections successfully created.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.state.created.load(Ordering::SeqCst)
    }

    /// Connections successfully destroyed.
    #[must_use]
    pub fn destroyed(&self) -> u64 {
        self.state.destroyed.load(Ordering::SeqCst)
    }

    /// Validation calls made by the pool.
    #[must_use]
    pub fn validations(&self) -> u64 {
        self.state.validations.load(Ordering::SeqCst)
    }

    /// Connections created and not yet destroyed.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.created().saturating_sub(self.destroyed())
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl ResourceFactory for MockFactory {
    type Resource = MockConnection;
    type Error = MockError;

    async fn create(&self) -> Result<MockConnection, MockError> {
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        if take_one(&self.state.fail_creates) {
            tracing::trace!("mock create failing");
            return Err(MockError::Refused);
        }

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection { id, queries: 0 })
    }

    async fn validate(&self, _conn: &mut MockConnection) -> Result<(), MockError> {
        self.state.validations.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.state.fail_validations) {
            return Err(MockError::Broken);
        }
        Ok(())
    }

    async fn destroy(
        &self,
        conn: MockConnection,
    ) -> Result<(), (MockConnection, MockError)> {
        if !self.destroy_delay.is_zero() {
            tokio::time::sleep(self.destroy_delay).await;
        }
        if take_one(&self.state.fail_destroys) {
            return Err((conn, MockError::CloseFailed));
        }
        self.state.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
