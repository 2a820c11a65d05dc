//! # respool-testing
//!
//! Test infrastructure for respool.
//!
//! ## Features
//!
//! - Mock resource factory with a live connection count (no database required)
//! - Scripted create, validate and destroy failures
//! - Configurable creation latency
//! - High-water-mark recording of pool stats
//!
//! ## Example
//!
//! ```rust,ignore
//! use respool::Pool;
//! use respool_testing::MockFactory;
//!
//! #[tokio::test]
//! async fn test_with_mock_factory() {
//!     let factory = MockFactory::new();
//!     let pool = Pool::builder(factory.clone()).max_size(5).build().unwrap();
//!
//!     let conn = pool.acquire().await.unwrap();
//!     assert_eq!(factory.live(), 1);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod fixtures;
pub mod mock;

pub use fixtures::{Watermark, wait_for_waiters};
pub use mock::{MockConnection, MockError, MockFactory};
