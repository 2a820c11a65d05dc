//! Resource lifecycle tracking.
//!
//! Every resource the pool holds carries a [`ResourceMetadata`] record. The
//! pool drives it through
//! `Created -> Idle <-> InUse -> (Idle -> Reaped)` and uses the timestamps
//! to decide when a resource is idle-expired or past its lifetime.

use std::time::Duration;

use tokio::time::Instant;

/// Lifecycle state of a pooled resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Just opened by the factory, not yet handed out.
    Created,
    /// Sitting in the idle set, available for checkout.
    Idle,
    /// Checked out by a caller.
    InUse,
    /// Destroyed after idling past `idle_timeout` or outliving `max_lifetime`.
    Reaped,
    /// Destroyed at the caller's request, after failed validation, or at
    /// shutdown.
    Discarded,
}

impl ResourceState {
    /// Check if the resource is available for checkout.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if the resource has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reaped | Self::Discarded)
    }
}

/// Metadata about a pooled resource.
#[derive(Debug, Clone)]
pub struct ResourceMetadata {
    /// Unique identifier for this resource within its pool.
    pub id: u64,
    /// When the resource was created.
    pub created_at: Instant,
    /// When the resource was last returned to the pool.
    pub last_released_at: Instant,
    /// Number of times the resource has been checked out.
    pub checkout_count: u64,
    /// Current state of the resource.
    pub state: ResourceState,
}

impl ResourceMetadata {
    /// Create metadata for a freshly created resource.
    pub fn new(id: u64) -> Self {
        let now = Instant::now();
        Self {
            id,
            created_at: now,
            last_released_at: now,
            checkout_count: 0,
            state: ResourceState::Created,
        }
    }

    /// Check if the resource has exceeded its maximum lifetime.
    #[must_use]
    pub fn is_expired(&self, max_lifetime: Option<Duration>, now: Instant) -> bool {
        max_lifetime.is_some_and(|lifetime| now.saturating_duration_since(self.created_at) >= lifetime)
    }

    /// Check if the resource has been idle for at least `idle_timeout`.
    #[must_use]
    pub fn is_idle_expired(&self, idle_timeout: Duration, now: Instant) -> bool {
        self.state == ResourceState::Idle
            && now.saturating_duration_since(self.last_released_at) >= idle_timeout
    }

    /// Mark the resource as checked out.
    pub fn mark_checkout(&mut self) {
        self.checkout_count += 1;
        self.state = ResourceState::InUse;
    }

    /// Mark the resource as returned to idle.
    pub fn mark_checkin(&mut self, now: Instant) {
        self.last_released_at = now;
        self.state = ResourceState::Idle;
    }
}
