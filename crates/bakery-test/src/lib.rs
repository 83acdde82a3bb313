//! Bakery Test - shared test utilities for the bakery crates.
//!
//! Mock clocks and instrumented backing stores used as a dev-dependency
//! across the workspace.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! bakery-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bakery_test::{CountingBacking, MockClock, test_epoch};
//!
//! #[tokio::test]
//! async fn test_cache_hit() {
//!     let clock = Arc::new(MockClock::new(test_epoch()));
//!     let backing = Arc::new(CountingBacking::new());
//!     // ... drive the cache, then:
//!     assert_eq!(backing.get_key_calls(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
