//! Pool error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PoolError {
    /// No resource became available before the acquisition timeout.
    #[error("pool exhausted: no resource available within {timeout:?} (max_size {max_size})")]
    Exhausted {
        /// Maximum number of resources the pool may hold.
        max_size: usize,
        /// How long the caller waited.
        timeout: Duration,
    },

    /// Pool is closed.
    #[error("pool is closed")]
    Closed,

    /// The resource factory failed to create a resource.
    #[error("failed to create resource: {0}")]
    ResourceCreation(String),

    /// Pool configuration error.
    #[error("pool configuration error: {0}")]
    Configuration(String),
}

impl PoolError {
    /// Whether retrying the acquisition later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Exhausted { .. } | Self::ResourceCreation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message() {
        let err = PoolError::Exhausted {
            max_size: 5,
            timeout: Duration::from_millis(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("pool exhausted"));
        assert!(msg.contains("max_size 5"));
        assert!(msg.contains("100ms"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(
            PoolError::Exhausted {
                max_size: 1,
                timeout: Duration::ZERO
            }
            .is_transient()
        );
        assert!(PoolError::ResourceCreation("refused".into()).is_transient());
        assert!(!PoolError::Closed.is_transient());
        assert!(!PoolError::Configuration("bad".into()).is_transient());
    }
}
