//! Prelude module - commonly used types for convenient import.
//!
//! Use `use bakery_core::prelude::*;` to import all essential types.

// Keys and policies
pub use crate::{KeyWindow, Policy, RootKey};

// Capabilities
pub use crate::Op;

// Time
pub use crate::{Clock, SystemClock};
