//! Mock implementations for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bakery_core::time::saturating_add;
use bakery_core::{Clock, RootKey};
use bakery_storage::{Backing, MemoryBacking, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use tokio::sync::{Notify, Semaphore};

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Create a clock stopped at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: std::time::Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now = saturating_add(*now, by);
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

/// An in-memory backing that counts calls to each method.
#[derive(Debug, Default)]
pub struct CountingBacking {
    inner: MemoryBacking,
    get_key_calls: AtomicUsize,
    find_latest_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl CountingBacking {
    /// Create an empty counting backing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding rows without touching the counters.
    #[must_use]
    pub fn inner(&self) -> &MemoryBacking {
        &self.inner
    }

    /// Number of `get_key` calls since creation or the last reset.
    #[must_use]
    pub fn get_key_calls(&self) -> usize {
        self.get_key_calls.load(Ordering::SeqCst)
    }

    /// Number of `find_latest_key` calls.
    #[must_use]
    pub fn find_latest_calls(&self) -> usize {
        self.find_latest_calls.load(Ordering::SeqCst)
    }

    /// Number of `insert_key` calls.
    #[must_use]
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Zero all counters.
    pub fn reset_counts(&self) {
        self.get_key_calls.store(0, Ordering::SeqCst);
        self.find_latest_calls.store(0, Ordering::SeqCst);
        self.insert_calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Backing for CountingBacking {
    async fn get_key(&self, id: &[u8]) -> StorageResult<RootKey> {
        self.get_key_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_key(id).await
    }

    async fn find_latest_key(
        &self,
        created_after: DateTime<Utc>,
        expires_after: DateTime<Utc>,
        expires_before: DateTime<Utc>,
    ) -> StorageResult<Option<RootKey>> {
        self.find_latest_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .find_latest_key(created_after, expires_after, expires_before)
            .await
    }

    async fn insert_key(&self, key: RootKey) -> StorageResult<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_key(key).await
    }
}

/// A backing whose methods can be made to fail.
///
/// Methods that are not configured to fail pass through to an in-memory
/// store.
#[derive(Debug, Default)]
pub struct FailingBacking {
    inner: MemoryBacking,
    fail_get_key: bool,
    fail_find_latest: bool,
    fail_insert: bool,
    collisions_left: AtomicUsize,
    insert_attempts: AtomicUsize,
}

impl FailingBacking {
    /// A backing that does not fail yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_key` fail with a connection error.
    #[must_use]
    pub fn fail_get_key(mut self) -> Self {
        self.fail_get_key = true;
        self
    }

    /// Make `find_latest_key` fail with a connection error.
    #[must_use]
    pub fn fail_find_latest(mut self) -> Self {
        self.fail_find_latest = true;
        self
    }

    /// Make `insert_key` fail with a connection error.
    #[must_use]
    pub fn fail_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    /// Report the next `n` inserts as duplicate-id conflicts.
    #[must_use]
    pub fn collide_inserts(self, n: usize) -> Self {
        self.collisions_left.store(n, Ordering::SeqCst);
        self
    }

    /// Number of `insert_key` calls, including failed ones.
    #[must_use]
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &MemoryBacking {
        &self.inner
    }

    fn unavailable() -> StorageError {
        StorageError::Connection("backing unavailable".to_string())
    }
}

#[async_trait]
impl Backing for FailingBacking {
    async fn get_key(&self, id: &[u8]) -> StorageResult<RootKey> {
        if self.fail_get_key {
            return Err(Self::unavailable());
        }
        self.inner.get_key(id).await
    }

    async fn find_latest_key(
        &self,
        created_after: DateTime<Utc>,
        expires_after: DateTime<Utc>,
        expires_before: DateTime<Utc>,
    ) -> StorageResult<Option<RootKey>> {
        if self.fail_find_latest {
            return Err(Self::unavailable());
        }
        self.inner
            .find_latest_key(created_after, expires_after, expires_before)
            .await
    }

    async fn insert_key(&self, key: RootKey) -> StorageResult<()> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(Self::unavailable());
        }
        let collided = self
            .collisions_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if collided {
            return Err(StorageError::AlreadyExists(key.id_display()));
        }
        self.inner.insert_key(key).await
    }
}

/// A backing whose `get_key` blocks until the test opens the gate.
///
/// Used to prove that a slow backing call does not stall other callers of
/// the cache.
#[derive(Debug)]
pub struct GatedBacking {
    inner: MemoryBacking,
    gate: Semaphore,
    entered: Notify,
}

impl GatedBacking {
    /// Create a backing with the gate closed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: MemoryBacking::new(),
            gate: Semaphore::new(0),
            entered: Notify::new(),
        }
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &MemoryBacking {
        &self.inner
    }

    /// Let `n` blocked or future `get_key` calls through.
    pub fn open(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Wait until some caller is inside `get_key`.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }
}

impl Default for GatedBacking {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backing for GatedBacking {
    async fn get_key(&self, id: &[u8]) -> StorageResult<RootKey> {
        self.entered.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        permit.forget();
        self.inner.get_key(id).await
    }

    async fn find_latest_key(
        &self,
        created_after: DateTime<Utc>,
        expires_after: DateTime<Utc>,
        expires_before: DateTime<Utc>,
    ) -> StorageResult<Option<RootKey>> {
        self.inner
            .find_latest_key(created_after, expires_after, expires_before)
            .await
    }

    async fn insert_key(&self, key: RootKey) -> StorageResult<()> {
        self.inner.insert_key(key).await
    }
}
