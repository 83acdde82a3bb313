//! Shared harness for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bakery_core::{Clock, Policy};
use bakery_oven::{Oven, OvenParams, SingleStore};
use bakery_rootkeys::{KeyStore, RootKeyCache};
use bakery_storage::{Backing, MemoryOpsStore, OpsStore};
use bakery_test::{MockClock, test_epoch};

/// One service instance: its own cache and oven over a shared backing.
pub struct Replica {
    pub cache: Arc<RootKeyCache>,
    pub store: KeyStore,
    pub oven: Oven,
}

impl Replica {
    pub fn new(
        clock: &Arc<MockClock>,
        backing: Arc<dyn Backing>,
        policy: Policy,
        ops_store: Option<Arc<MemoryOpsStore>>,
    ) -> Self {
        let cache = Arc::new(RootKeyCache::with_clock(
            100,
            Arc::clone(clock) as Arc<dyn Clock>,
        ));
        let store = cache.new_store(backing, policy);
        let oven = Oven::new(OvenParams {
            location: "https://auth.example.com".to_owned(),
            root_key_store_for_ops: Some(Arc::new(SingleStore(Arc::new(store.clone())))),
            ops_store: ops_store.map(|s| s as Arc<dyn OpsStore>),
            legacy_macaroon_op: None,
        });
        Self { cache, store, oven }
    }
}

pub fn stopped_clock() -> Arc<MockClock> {
    Arc::new(MockClock::new(test_epoch()))
}
