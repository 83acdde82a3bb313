//! Root-key error types.

use bakery_storage::StorageError;
use thiserror::Error;

/// Errors from root-key lookup and generation.
#[derive(Debug, Error)]
pub enum RootKeyError {
    /// No usable key with the requested id exists.
    ///
    /// Covers keys that never existed, keys that have expired, and keys
    /// remembered as absent by the cache.
    #[error("root key not found")]
    NotFound,

    /// The backing store failed.
    #[error("{context}: {source}")]
    Storage {
        /// What the store was doing when the backing failed.
        context: &'static str,
        /// The backing's error.
        #[source]
        source: StorageError,
    },
}

impl RootKeyError {
    /// Wrap a backing failure with the operation it interrupted.
    #[must_use]
    pub fn storage(context: &'static str, source: StorageError) -> Self {
        Self::Storage { context, source }
    }

    /// Whether this is the distinguished not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Result type for root-key operations.
pub type RootKeyResult<T> = Result<T, RootKeyError>;
