//! Prelude module - commonly used types for convenient import.
//!
//! Use `use bakery_rootkeys::prelude::*;` to import all essential types.

pub use crate::{KeyStore, MemRootKeyStore, RootKeyCache, RootKeyStore};

pub use crate::{RootKeyError, RootKeyResult, Secret};
