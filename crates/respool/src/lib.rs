//! # respool
//!
//! Bounded async resource pool with a hard capacity limit.
//!
//! The pool hands out resources produced by a user-supplied
//! [`ResourceFactory`] (typically database connections) and never holds more
//! than `max_size` of them, counting idle, checked-out, and resources being
//! created or destroyed.
//!
//! ## Features
//!
//! - Hard `max_size` bound, enforced under a single lock
//! - FIFO waiter queue with per-call acquisition timeout
//! - Released resources handed directly to the oldest waiter
//! - Periodic idle reaper plus on-demand sweeps
//! - Optional maximum lifetime and validation on checkout
//! - Scoped acquisition that releases on every exit path
//! - Stats and lifetime metrics for observability
//!
//! ## Example
//!
//! ```rust,ignore
//! use respool::{Pool, PoolConfig};
//!
//! let config = PoolConfig::new()
//!     .max_size(5)
//!     .idle_timeout(Duration::from_secs(2));
//!
//! let pool = Pool::new(factory, config)?;
//! let mut conn = pool.acquire().await?;
//! // Use connection...
//! // Connection automatically returned to pool on drop
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod metrics;
pub mod pool;
pub mod pooled;
pub mod reaper;

pub use config::PoolConfig;
pub use error::PoolError;
pub use factory::ResourceFactory;
pub use lifecycle::{ResourceMetadata, ResourceState};
pub use metrics::PoolMetrics;
pub use pool::{Pool, PoolBuilder, PoolStats, PoolStatus};
pub use pooled::Pooled;
pub use reaper::ReapReport;
