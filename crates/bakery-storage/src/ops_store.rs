//! Durable storage of large operation sets.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bakery_core::{Clock, Op, SystemClock};
use chrono::{DateTime, Utc};

use crate::error::{StorageError, StorageResult};

/// Storage for operation sets that are too large to embed in a macaroon.
///
/// Entries are keyed by a content-addressed reference string; storing the
/// same reference twice stores the same operations.
#[async_trait]
pub trait OpsStore: Send + Sync {
    /// Store `ops` under `reference` until `expiry`.
    async fn put_ops(
        &self,
        reference: &str,
        ops: &[Op],
        expiry: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Fetch the operations stored under `reference`.
    ///
    /// Returns [`StorageError::NotFound`] if absent or expired.
    async fn get_ops(&self, reference: &str) -> StorageResult<Vec<Op>>;
}

#[derive(Debug, Clone)]
struct OpsEntry {
    ops: Vec<Op>,
    expiry: DateTime<Utc>,
}

/// In-memory ops store with expiry checked on read.
#[derive(Debug)]
pub struct MemoryOpsStore {
    entries: RwLock<HashMap<String, OpsEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryOpsStore {
    /// Create an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store using the given clock for expiry checks.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryOpsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpsStore for MemoryOpsStore {
    async fn put_ops(
        &self,
        reference: &str,
        ops: &[Op],
        expiry: DateTime<Utc>,
    ) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        // Keep the later expiry when the same set is stored again.
        let expiry = entries
            .get(reference)
            .map_or(expiry, |existing| existing.expiry.max(expiry));
        entries.insert(
            reference.to_owned(),
            OpsEntry {
                ops: ops.to_vec(),
                expiry,
            },
        );
        Ok(())
    }

    async fn get_ops(&self, reference: &str) -> StorageResult<Vec<Op>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        match entries.get(reference) {
            Some(entry) if self.clock.now() <= entry.expiry => Ok(entry.ops.clone()),
            _ => Err(StorageError::NotFound(reference.to_owned())),
        }
    }
}
