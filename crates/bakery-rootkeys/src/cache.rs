//! Two-generation root-key cache.
//!
//! Keys are held in two maps, `cache` and `old_cache`. When `cache` reaches
//! its size limit it becomes `old_cache` and the previous `old_cache` is
//! dropped, so the cache holds at most twice the limit and recently used keys
//! survive one rotation. A hit in `old_cache` promotes the key back into
//! `cache`.
//!
//! Absent and expired ids are remembered as the zero-valued [`RootKey`], so a
//! stream of lookups for a bogus id hits the backing store only once per
//! generation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bakery_core::{Clock, Policy, RootKey, SystemClock};
use bakery_storage::Backing;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{RootKeyError, RootKeyResult};
use crate::store::KeyStore;

/// Size limit of one generation used when none is configured.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

/// Maximum number of distinct policies whose current key is remembered.
pub const MAX_POLICY_CACHE: usize = 100;

#[derive(Debug, Default)]
struct CacheState {
    cache: HashMap<Vec<u8>, RootKey>,
    old_cache: HashMap<Vec<u8>, RootKey>,
    current: HashMap<Policy, RootKey>,
}

impl CacheState {
    fn insert(&mut self, max_cache_size: usize, id: Vec<u8>, key: RootKey) {
        if !self.cache.contains_key(&id) && self.cache.len() >= max_cache_size {
            debug!(size = self.cache.len(), "rotating root key cache generation");
            self.old_cache = std::mem::take(&mut self.cache);
        }
        self.cache.insert(id, key);
    }

    fn set_current(&mut self, policy: Policy, key: RootKey) {
        if !self.current.contains_key(&policy) && self.current.len() >= MAX_POLICY_CACHE {
            warn!(
                limit = MAX_POLICY_CACHE,
                "too many distinct root key policies; forgetting current keys"
            );
            self.current.clear();
        }
        self.current.insert(policy, key);
    }
}

enum Probe {
    Cached(RootKey),
    Old(RootKey),
    Miss,
}

/// A process-wide cache of root keys shared by every [`KeyStore`] built from
/// it.
///
/// All methods are safe to call concurrently. The internal lock is never held
/// across a backing call.
#[derive(Debug)]
pub struct RootKeyCache {
    max_cache_size: usize,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl RootKeyCache {
    /// Create a cache whose generations hold up to `max_cache_size` keys,
    /// using the system clock.
    #[must_use]
    pub fn new(max_cache_size: usize) -> Self {
        Self::with_clock(max_cache_size, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    #[must_use]
    pub fn with_clock(max_cache_size: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_cache_size,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// A [`KeyStore`] that hands out keys from `backing` under `policy`,
    /// sharing this cache with every other store built from it.
    #[must_use]
    pub fn new_store(self: &Arc<Self>, backing: Arc<dyn Backing>, policy: Policy) -> KeyStore {
        KeyStore::new(Arc::clone(self), backing, policy)
    }

    /// The current time according to the cache's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Configured size limit of one generation.
    #[must_use]
    pub fn max_cache_size(&self) -> usize {
        self.max_cache_size
    }

    /// Entries in the current generation, including remembered absences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().cache.len()
    }

    /// Whether both generations are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let state = self.lock();
        state.cache.is_empty() && state.old_cache.is_empty()
    }

    /// Entries in the previous generation.
    #[must_use]
    pub fn old_len(&self) -> usize {
        self.lock().old_cache.len()
    }

    /// Number of policies with a remembered current key.
    #[must_use]
    pub fn current_len(&self) -> usize {
        self.lock().current.len()
    }

    /// Look up the key with `id`, consulting `backing` on a miss.
    ///
    /// A key that has expired at the cache's current time is reported as
    /// not found, and the absence is remembered.
    ///
    /// # Errors
    ///
    /// Returns [`RootKeyError::NotFound`] if the key is absent or expired,
    /// and [`RootKeyError::Storage`] if the backing fails for any other
    /// reason. Backing failures are never cached.
    pub async fn get(&self, id: &[u8], backing: &dyn Backing) -> RootKeyResult<RootKey> {
        let probe = {
            let state = self.lock();
            if let Some(key) = state.cache.get(id) {
                Probe::Cached(key.clone())
            } else if let Some(key) = state.old_cache.get(id) {
                Probe::Old(key.clone())
            } else {
                Probe::Miss
            }
        };

        let (key, in_cache) = match probe {
            Probe::Cached(key) => (key, true),
            Probe::Old(key) => (key, false),
            Probe::Miss => {
                debug!(id = %String::from_utf8_lossy(id), "root key cache miss");
                match backing.get_key(id).await {
                    Ok(key) => (key, false),
                    Err(e) if e.is_not_found() => (RootKey::default(), false),
                    Err(e) => return Err(RootKeyError::storage("cannot get root key", e)),
                }
            },
        };

        let key = if key.is_valid() && key.is_expired(self.now()) {
            debug!(id = %key.id_display(), "root key has expired");
            RootKey::default()
        } else {
            key
        };

        if !in_cache {
            self.lock().insert(self.max_cache_size, id.to_vec(), key.clone());
        }

        if key.is_valid() {
            Ok(key)
        } else {
            Err(RootKeyError::NotFound)
        }
    }

    /// Add `key` to the current generation under its own id.
    ///
    /// Rotates the generations first if the current one is full.
    pub fn insert(&self, key: RootKey) {
        let id = key.id.clone();
        self.lock().insert(self.max_cache_size, id, key);
    }

    /// Remember `key` as the current key for `policy`.
    ///
    /// The map of current keys is cleared once it would exceed
    /// [`MAX_POLICY_CACHE`] distinct policies.
    pub fn set_current(&self, policy: Policy, key: RootKey) {
        self.lock().set_current(policy, key);
    }

    /// A cached key usable under `policy` right now.
    ///
    /// Checks the remembered current key first, then scans the current
    /// generation for the most recently created qualifying key and remembers
    /// it. The previous generation is not scanned.
    #[must_use]
    pub fn find_current_for_policy(&self, policy: &Policy) -> Option<RootKey> {
        let now = self.now();
        let mut state = self.lock();

        if let Some(key) = state.current.get(policy)
            && key.is_valid_with_policy(policy, now)
        {
            return Some(key.clone());
        }

        let best = state
            .cache
            .values()
            .filter(|key| key.is_valid_with_policy(policy, now))
            .max_by_key(|key| key.created)
            .cloned()?;
        state.set_current(*policy, best.clone());
        Some(best)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Every update is a single map operation, so a poisoned guard still
        // holds consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RootKeyCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bakery_storage::Backing as _;
    use bakery_test::{CountingBacking, FailingBacking, MockClock, test_epoch, test_root_key};

    fn cache_at_epoch(max: usize) -> (Arc<MockClock>, RootKeyCache) {
        let clock = Arc::new(MockClock::new(test_epoch()));
        let cache = RootKeyCache::with_clock(max, Arc::clone(&clock) as Arc<dyn Clock>);
        (clock, cache)
    }

    #[tokio::test]
    async fn test_get_caches_backing_result() {
        let (_clock, cache) = cache_at_epoch(10);
        let backing = CountingBacking::new();
        backing
            .inner()
            .insert_key(test_root_key("k1", 0, 100))
            .await
            .unwrap();

        let first = cache.get(b"k1", &backing).await.unwrap();
        let second = cache.get(b"k1", &backing).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.secret, b"secret-k1");
        assert_eq!(backing.get_key_calls(), 1);
    }

    #[tokio::test]
    async fn test_absent_id_is_remembered() {
        let (_clock, cache) = cache_at_epoch(10);
        let backing = CountingBacking::new();

        for _ in 0..5 {
            let err = cache.get(b"bogus", &backing).await.unwrap_err();
            assert!(err.is_not_found());
        }
        assert_eq!(backing.get_key_calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_cached_key_is_not_found_without_backing_call() {
        let (clock, cache) = cache_at_epoch(10);
        let backing = CountingBacking::new();
        backing
            .inner()
            .insert_key(test_root_key("k1", 0, 100))
            .await
            .unwrap();

        cache.get(b"k1", &backing).await.unwrap();
        backing.reset_counts();

        clock.advance(Duration::from_secs(101));
        assert!(cache.get(b"k1", &backing).await.unwrap_err().is_not_found());
        assert!(cache.get(b"k1", &backing).await.unwrap_err().is_not_found());
        assert_eq!(backing.get_key_calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_backing_row_is_cached_as_absent() {
        let (clock, cache) = cache_at_epoch(10);
        let backing = CountingBacking::new();
        backing
            .inner()
            .insert_key(test_root_key("k1", 0, 100))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(200));

        assert!(cache.get(b"k1", &backing).await.unwrap_err().is_not_found());
        assert!(cache.get(b"k1", &backing).await.unwrap_err().is_not_found());
        assert_eq!(backing.get_key_calls(), 1);
    }

    #[tokio::test]
    async fn test_backing_failure_is_not_cached() {
        let (_clock, cache) = cache_at_epoch(10);
        let backing = FailingBacking::new().fail_get_key();

        let err = cache.get(b"k1", &backing).await.unwrap_err();
        assert!(matches!(
            err,
            RootKeyError::Storage {
                context: "cannot get root key",
                ..
            }
        ));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_old_generation_hit_is_promoted() {
        let (_clock, cache) = cache_at_epoch(2);
        let backing = CountingBacking::new();

        cache.insert(test_root_key("a", 0, 100));
        cache.insert(test_root_key("b", 0, 100));
        // Full: this rotates a and b into the old generation.
        cache.insert(test_root_key("c", 0, 100));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.old_len(), 2);

        let a = cache.get(b"a", &backing).await.unwrap();
        assert_eq!(a.secret, b"secret-a");
        assert_eq!(backing.get_key_calls(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_reinserting_cached_id_does_not_rotate() {
        let (_clock, cache) = cache_at_epoch(2);
        cache.insert(test_root_key("a", 0, 100));
        cache.insert(test_root_key("b", 0, 100));
        cache.insert(test_root_key("b", 0, 200));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.old_len(), 0);
    }

    #[test]
    fn test_find_current_prefers_newest_qualifying_key() {
        let (clock, cache) = cache_at_epoch(10);
        let policy = Policy::new(Duration::from_secs(60), Duration::from_secs(3_600));
        clock.advance(Duration::from_secs(100));

        // Window at t=100: created >= 40, expires in [3700, 3760].
        cache.insert(test_root_key("older", 50, 3_710));
        cache.insert(test_root_key("newer", 90, 3_750));
        cache.insert(test_root_key("stale", 10, 3_720));
        cache.insert(test_root_key("long", 95, 9_000));

        let found = cache.find_current_for_policy(&policy).unwrap();
        assert_eq!(found.id, b"newer");
        assert_eq!(cache.current_len(), 1);

        clock.advance(Duration::from_secs(60));
        assert!(cache.find_current_for_policy(&policy).is_none());
    }

    #[test]
    fn test_find_current_ignores_old_generation() {
        let (_clock, cache) = cache_at_epoch(1);
        let policy = Policy::new(Duration::from_secs(60), Duration::from_secs(3_600));
        cache.insert(test_root_key("good", 0, 3_630));
        cache.insert(test_root_key("other", 0, 1));
        assert_eq!(cache.old_len(), 1);

        assert!(cache.find_current_for_policy(&policy).is_none());
    }

    #[test]
    fn test_current_map_is_bounded() {
        let (_clock, cache) = cache_at_epoch(10);
        for secs in 1..=250u64 {
            let policy = Policy::new(Duration::from_secs(secs), Duration::from_secs(3_600));
            cache.set_current(policy, test_root_key("k", 0, 3_600));
            assert!(cache.current_len() <= MAX_POLICY_CACHE);
        }
    }
}
