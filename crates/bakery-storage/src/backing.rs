//! Durable root-key storage.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bakery_core::RootKey;
use chrono::{DateTime, Utc};

use crate::error::{StorageError, StorageResult};

/// Durable storage of root keys.
///
/// Implementations may be slow (network round-trips); callers never hold
/// locks across these calls. Timeouts and cancellation are the
/// implementation's responsibility: callers simply drop the future.
#[async_trait]
pub trait Backing: Send + Sync {
    /// Fetch the key with the given id.
    ///
    /// Returns [`StorageError::NotFound`] if there is no such row. Expired rows
    /// that have not yet been physically removed may still be returned.
    async fn get_key(&self, id: &[u8]) -> StorageResult<RootKey>;

    /// Find the most recently created key with
    /// `created >= created_after`, `expires >= expires_after` and
    /// `expires <= expires_before`.
    ///
    /// Returns `Ok(None)` when no row matches.
    async fn find_latest_key(
        &self,
        created_after: DateTime<Utc>,
        expires_after: DateTime<Utc>,
        expires_before: DateTime<Utc>,
    ) -> StorageResult<Option<RootKey>>;

    /// Insert a new key.
    ///
    /// Returns [`StorageError::AlreadyExists`] if a row with the same id is
    /// present.
    async fn insert_key(&self, key: RootKey) -> StorageResult<()>;
}

/// In-memory backing store.
///
/// Rows live until [`remove_expired`](Self::remove_expired) is called, which
/// stands in for the expiry mechanism of a real database.
#[derive(Debug, Default)]
pub struct MemoryBacking {
    keys: RwLock<HashMap<Vec<u8>, RootKey>>,
}

impl MemoryBacking {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.keys.read().map(|k| k.len()).unwrap_or(0)
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physically delete every row that has expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn remove_expired(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let before = keys.len();
        keys.retain(|_, key| !key.is_expired(now));
        Ok(before.saturating_sub(keys.len()))
    }
}

#[async_trait]
impl Backing for MemoryBacking {
    async fn get_key(&self, id: &[u8]) -> StorageResult<RootKey> {
        let keys = self
            .keys
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        keys.get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(String::from_utf8_lossy(id).into_owned()))
    }

    async fn find_latest_key(
        &self,
        created_after: DateTime<Utc>,
        expires_after: DateTime<Utc>,
        expires_before: DateTime<Utc>,
    ) -> StorageResult<Option<RootKey>> {
        let keys = self
            .keys
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(keys
            .values()
            .filter(|k| {
                k.is_valid()
                    && k.created >= created_after
                    && k.expires >= expires_after
                    && k.expires <= expires_before
            })
            .max_by_key(|k| k.created)
            .cloned())
    }

    async fn insert_key(&self, key: RootKey) -> StorageResult<()> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        if keys.contains_key(&key.id) {
            return Err(StorageError::AlreadyExists(key.id_display()));
        }
        tracing::trace!(id = %key.id_display(), "stored root key");
        keys.insert(key.id.clone(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn key(id: &str, created: i64, expires: i64) -> RootKey {
        RootKey {
            id: id.as_bytes().to_vec(),
            created: at(created),
            expires: at(expires),
            secret: format!("secret-{id}").into_bytes(),
        }
    }

    #[tokio::test]
    async fn test_get_and_insert() {
        let backing = MemoryBacking::new();
        backing.insert_key(key("a", 0, 100)).await.unwrap();

        let got = backing.get_key(b"a").await.unwrap();
        assert_eq!(got.secret, b"secret-a");

        assert!(backing.get_key(b"missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails_distinctly() {
        let backing = MemoryBacking::new();
        backing.insert_key(key("a", 0, 100)).await.unwrap();
        let err = backing.insert_key(key("a", 5, 200)).await.unwrap_err();
        assert!(err.is_already_exists());
        // Original row untouched.
        assert_eq!(backing.get_key(b"a").await.unwrap().created, at(0));
    }

    #[tokio::test]
    async fn test_find_latest_picks_greatest_created_within_bounds() {
        let backing = MemoryBacking::new();
        backing.insert_key(key("old", 10, 200)).await.unwrap();
        backing.insert_key(key("new", 20, 210)).await.unwrap();
        backing.insert_key(key("too-new-expiry", 30, 999)).await.unwrap();

        let found = backing
            .find_latest_key(at(0), at(150), at(250))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, b"new");

        // Inclusive bounds.
        let found = backing
            .find_latest_key(at(20), at(210), at(210))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, b"new");

        assert!(
            backing
                .find_latest_key(at(21), at(0), at(300))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let backing = MemoryBacking::new();
        backing.insert_key(key("a", 0, 100)).await.unwrap();
        backing.insert_key(key("b", 0, 300)).await.unwrap();

        assert_eq!(backing.remove_expired(at(200)).unwrap(), 1);
        assert_eq!(backing.len(), 1);
        assert!(backing.get_key(b"a").await.unwrap_err().is_not_found());
    }
}
