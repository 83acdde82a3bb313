//! Bakery Root Keys - policy-driven root-key caching.
//!
//! Minting a macaroon needs a root key that will stay valid for at least the
//! macaroon's intended lifetime; verifying one needs the key it was minted
//! with, looked up by id. Both happen on every request, while the keys live
//! in a slow shared [`Backing`](bakery_storage::Backing) store.
//!
//! [`RootKeyCache`] is a process-wide, two-generation cache in front of that
//! store. [`KeyStore`]s bind the cache to one backing and one
//! [`Policy`](bakery_core::Policy):
//!
//! - [`RootKeyStore::root_key`] reuses the newest key whose timestamps fit
//!   the policy window, asks the backing for one, or generates and stores a
//!   new one.
//! - [`RootKeyStore::get`] resolves an id through the cache, remembering
//!   absent and expired ids.
//!
//! Replicas sharing a backing converge on the same key per policy window, so
//! a macaroon minted by one verifies on all.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use bakery_core::Policy;
//! use bakery_rootkeys::{RootKeyCache, RootKeyStore};
//! use bakery_storage::MemoryBacking;
//!
//! let cache = Arc::new(RootKeyCache::new(1000));
//! let store = cache.new_store(
//!     Arc::new(MemoryBacking::new()),
//!     Policy::new(Duration::from_secs(60), Duration::from_secs(3600)),
//! );
//!
//! let (secret, id) = store.root_key().await?;
//! assert_eq!(store.get(&id).await?, secret);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod cache;
mod error;
mod mem;
mod store;

pub use cache::{DEFAULT_MAX_CACHE_SIZE, MAX_POLICY_CACHE, RootKeyCache};
pub use error::{RootKeyError, RootKeyResult};
pub use mem::{MEM_KEY_ID, MemRootKeyStore};
pub use store::{KeyStore, MAX_INSERT_ATTEMPTS, RootKeyStore, Secret};
