//! Prelude module - commonly used types for convenient import.
//!
//! Use `use bakery_oven::prelude::*;` to import all essential types.

// Minting and verification
pub use crate::{MacaroonOps, Oven, OvenParams, Version};

// Store selection
pub use crate::{KeyStoreSelector, RoutedSelector, SingleStore};

// Errors
pub use crate::{OvenError, OvenResult, VerificationError};
