//! Prefix-routed root-key store selection.

use std::sync::Arc;

use bakery_core::Op;
use bakery_rootkeys::RootKeyStore;

use crate::oven::KeyStoreSelector;

/// Routes operation sets to root-key stores by entity prefix.
///
/// The first operation of the set decides; the longest matching prefix
/// wins, and sets that match no route use the fallback store.
#[derive(Clone)]
pub struct RoutedSelector {
    routes: Vec<(String, Arc<dyn RootKeyStore>)>,
    fallback: Arc<dyn RootKeyStore>,
}

impl RoutedSelector {
    /// A selector that sends everything to `fallback` until routes are
    /// added.
    #[must_use]
    pub fn new(fallback: Arc<dyn RootKeyStore>) -> Self {
        Self {
            routes: Vec::new(),
            fallback,
        }
    }

    /// Send operation sets whose first entity starts with `prefix` to
    /// `store`.
    #[must_use]
    pub fn with_route(mut self, prefix: impl Into<String>, store: Arc<dyn RootKeyStore>) -> Self {
        self.routes.push((prefix.into(), store));
        self
    }

    /// Number of configured routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

impl KeyStoreSelector for RoutedSelector {
    fn select(&self, ops: &[Op]) -> Arc<dyn RootKeyStore> {
        let Some(first) = ops.first() else {
            return Arc::clone(&self.fallback);
        };
        self.routes
            .iter()
            .filter(|(prefix, _)| first.entity.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or_else(|| Arc::clone(&self.fallback), |(_, store)| Arc::clone(store))
    }
}

impl std::fmt::Debug for RoutedSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutedSelector")
            .field(
                "routes",
                &self.routes.iter().map(|(p, _)| p.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakery_rootkeys::MemRootKeyStore;

    fn store() -> Arc<dyn RootKeyStore> {
        Arc::new(MemRootKeyStore::new())
    }

    #[test]
    fn test_longest_prefix_wins() {
        let fallback = store();
        let docs = store();
        let secret_docs = store();
        let selector = RoutedSelector::new(Arc::clone(&fallback))
            .with_route("doc", Arc::clone(&docs))
            .with_route("doc-secret", Arc::clone(&secret_docs));

        let pick = |entity: &str| selector.select(&[Op::new(entity, "read")]);
        assert!(Arc::ptr_eq(&pick("doc-1"), &docs));
        assert!(Arc::ptr_eq(&pick("doc-secret-1"), &secret_docs));
        assert!(Arc::ptr_eq(&pick("user-1"), &fallback));
        assert!(Arc::ptr_eq(&selector.select(&[]), &fallback));
    }
}
