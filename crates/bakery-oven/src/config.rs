//! Building an oven from [`BakeryConfig`].

use std::sync::Arc;
use std::time::Duration;

use bakery_config::{BakeryConfig, PolicySection};
use bakery_core::{Op, Policy};
use bakery_rootkeys::{RootKeyCache, RootKeyStore};
use bakery_storage::{Backing, OpsStore};
use tracing::info;

use crate::error::{OvenError, OvenResult};
use crate::oven::{Oven, OvenParams};
use crate::selector::RoutedSelector;
use crate::version::Version;

/// Convert a configured policy.
#[must_use]
pub fn policy_from_section(section: &PolicySection) -> Policy {
    Policy::new(
        Duration::from_secs(section.generate_interval_secs),
        Duration::from_secs(section.expiry_secs),
    )
}

/// The version new macaroons are minted with.
///
/// # Errors
///
/// Returns [`OvenError::Config`] for an unknown version number.
pub fn minting_version(config: &BakeryConfig) -> OvenResult<Version> {
    Version::from_number(config.oven.version).ok_or_else(|| {
        OvenError::Config(format!("unknown bakery version {}", config.oven.version))
    })
}

/// Build an oven whose root keys come from `backing` through `cache`.
///
/// `[oven].policy` names the policy for operations that match no route;
/// each `[oven.routes]` entry maps an entity prefix to a policy name.
///
/// # Errors
///
/// Returns [`OvenError::Config`] if a referenced policy does not exist.
pub fn oven_from_config(
    config: &BakeryConfig,
    cache: &Arc<RootKeyCache>,
    backing: Arc<dyn Backing>,
    ops_store: Option<Arc<dyn OpsStore>>,
) -> OvenResult<Oven> {
    let store_for = |name: &str| -> OvenResult<Arc<dyn RootKeyStore>> {
        let section = config
            .policies
            .get(name)
            .ok_or_else(|| OvenError::Config(format!("unknown policy '{name}'")))?;
        Ok(Arc::new(cache.new_store(
            Arc::clone(&backing),
            policy_from_section(section),
        )))
    };

    let mut selector = RoutedSelector::new(store_for(&config.oven.policy)?);
    for (prefix, policy) in &config.oven.routes {
        selector = selector.with_route(prefix.clone(), store_for(policy)?);
    }
    info!(
        location = %config.oven.location,
        policy = %config.oven.policy,
        routes = selector.route_count(),
        "configured oven"
    );

    Ok(Oven::new(OvenParams {
        location: config.oven.location.clone(),
        root_key_store_for_ops: Some(Arc::new(selector)),
        ops_store,
        legacy_macaroon_op: config
            .oven
            .legacy_op
            .as_ref()
            .map(|op| Op::new(op.entity.clone(), op.action.clone())),
    }))
}
