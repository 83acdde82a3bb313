//! Prelude module - commonly used test utilities.
//!
//! Use `use bakery_test::prelude::*;` in test modules.

pub use crate::fixtures::{test_epoch, test_ops, test_policy, test_root_key};
pub use crate::mocks::{CountingBacking, FailingBacking, GatedBacking, MockClock};
