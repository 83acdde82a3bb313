//! Single-key in-memory root-key store.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bakery_core::SECRET_LEN;
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{RootKeyError, RootKeyResult};
use crate::store::{RootKeyStore, Secret};

/// Id of the only key a [`MemRootKeyStore`] ever holds.
pub const MEM_KEY_ID: &[u8] = b"0";

/// A [`RootKeyStore`] holding one lazily generated key that never expires.
///
/// Suitable for tests and for single-process services whose macaroons need
/// not survive a restart.
#[derive(Debug, Default)]
pub struct MemRootKeyStore {
    key: Mutex<Option<Secret>>,
}

impl MemRootKeyStore {
    /// Create a store with no key yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RootKeyStore for MemRootKeyStore {
    async fn get(&self, id: &[u8]) -> RootKeyResult<Secret> {
        if id != MEM_KEY_ID {
            return Err(RootKeyError::NotFound);
        }
        let key = self.key.lock().unwrap_or_else(PoisonError::into_inner);
        key.clone().ok_or(RootKeyError::NotFound)
    }

    async fn root_key(&self) -> RootKeyResult<(Secret, Vec<u8>)> {
        let mut key = self.key.lock().unwrap_or_else(PoisonError::into_inner);
        let secret = key.get_or_insert_with(|| {
            let mut secret = Zeroizing::new(vec![0u8; SECRET_LEN]);
            OsRng.fill_bytes(&mut secret);
            secret
        });
        Ok((secret.clone(), MEM_KEY_ID.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_key_is_generated_once() {
        let store = MemRootKeyStore::new();
        assert!(store.get(MEM_KEY_ID).await.unwrap_err().is_not_found());

        let (secret, id) = store.root_key().await.unwrap();
        assert_eq!(id, MEM_KEY_ID);
        assert_eq!(secret.len(), SECRET_LEN);

        let (again, _) = store.root_key().await.unwrap();
        assert_eq!(secret, again);
        assert_eq!(store.get(MEM_KEY_ID).await.unwrap(), secret);
        assert!(store.get(b"1").await.unwrap_err().is_not_found());
    }
}
