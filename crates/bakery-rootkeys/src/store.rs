//! Root-key stores as seen by an oven.

use std::sync::Arc;

use async_trait::async_trait;
use bakery_core::{Policy, RootKey};
use bakery_storage::Backing;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::cache::RootKeyCache;
use crate::error::{RootKeyError, RootKeyResult};

/// A root-key secret, wiped from memory when dropped.
pub type Secret = Zeroizing<Vec<u8>>;

/// How many freshly generated keys are tried before an id collision is
/// reported as an error.
pub const MAX_INSERT_ATTEMPTS: usize = 3;

/// Source of root keys for minting and verifying macaroons.
#[async_trait]
pub trait RootKeyStore: Send + Sync {
    /// The secret of the key with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RootKeyError::NotFound`] if there is no usable key with
    /// that id.
    async fn get(&self, id: &[u8]) -> RootKeyResult<Secret>;

    /// A key suitable for minting a new macaroon, as `(secret, id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if no key can be found or created.
    async fn root_key(&self) -> RootKeyResult<(Secret, Vec<u8>)>;
}

/// A [`RootKeyStore`] bound to one backing and one [`Policy`], sharing a
/// [`RootKeyCache`] with every other store built from the same cache.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct KeyStore {
    cache: Arc<RootKeyCache>,
    backing: Arc<dyn Backing>,
    policy: Policy,
}

impl KeyStore {
    /// Bind `cache` and `backing` under `policy`.
    ///
    /// Usually reached through [`RootKeyCache::new_store`].
    #[must_use]
    pub fn new(cache: Arc<RootKeyCache>, backing: Arc<dyn Backing>, policy: Policy) -> Self {
        Self {
            cache,
            backing,
            policy,
        }
    }

    /// The policy this store hands keys out under.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The shared cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<RootKeyCache> {
        &self.cache
    }

    /// The full key [`root_key`](RootKeyStore::root_key) would hand out.
    ///
    /// # Errors
    ///
    /// Returns [`RootKeyError::Storage`] if the backing cannot be queried or
    /// a new key cannot be stored.
    pub async fn current_key(&self) -> RootKeyResult<RootKey> {
        if let Some(key) = self.cache.find_current_for_policy(&self.policy) {
            return Ok(key);
        }

        let now = self.cache.now();
        let window = self.policy.window(now);
        let found = self
            .backing
            .find_latest_key(
                window.created_after,
                window.expires_after,
                window.expires_before,
            )
            .await
            .map_err(|e| RootKeyError::storage("cannot query existing keys", e))?;

        let key = match found {
            Some(key) if key.is_valid() => {
                debug!(id = %key.id_display(), "reusing stored root key");
                key
            },
            _ => self.generate(now).await?,
        };

        self.cache.insert(key.clone());
        self.cache.set_current(self.policy, key.clone());
        Ok(key)
    }

    async fn generate(&self, now: DateTime<Utc>) -> RootKeyResult<RootKey> {
        let mut attempts = 0usize;
        loop {
            attempts = attempts.saturating_add(1);
            let key = RootKey::generate(now, self.policy.lifetime());
            match self.backing.insert_key(key.clone()).await {
                Ok(()) => {
                    info!(id = %key.id_display(), expires = %key.expires, "generated new root key");
                    return Ok(key);
                },
                Err(e) if e.is_already_exists() && attempts < MAX_INSERT_ATTEMPTS => {
                    warn!(attempt = attempts, "root key id collision; regenerating");
                },
                Err(e) => return Err(RootKeyError::storage("cannot create root key", e)),
            }
        }
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("policy", &self.policy)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RootKeyStore for KeyStore {
    async fn get(&self, id: &[u8]) -> RootKeyResult<Secret> {
        let key = self.cache.get(id, self.backing.as_ref()).await?;
        Ok(Zeroizing::new(key.secret.clone()))
    }

    async fn root_key(&self) -> RootKeyResult<(Secret, Vec<u8>)> {
        let key = self.current_key().await?;
        Ok((Zeroizing::new(key.secret.clone()), key.id.clone()))
    }
}
