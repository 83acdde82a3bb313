//! Minting and decoding macaroons.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bakery_core::Op;
use bakery_macaroon::{Caveat, Macaroon, MacaroonVersion};
use bakery_rootkeys::{MemRootKeyStore, RootKeyStore};
use bakery_storage::OpsStore;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{OvenError, OvenResult, VerificationError};
use crate::id::MacaroonId;
use crate::ops::{MULTI_OP_ACTION, canonical_ops, is_multi_op_entity, ops_entity};
use crate::version::Version;

/// Chooses the root-key store for a set of operations.
///
/// Called with the canonical operations when minting and with the resolved
/// operations when verifying, so the same set always maps to the same
/// store.
pub trait KeyStoreSelector: Send + Sync {
    /// The store to mint or verify `ops` with.
    fn select(&self, ops: &[Op]) -> Arc<dyn RootKeyStore>;
}

impl<F> KeyStoreSelector for F
where
    F: Fn(&[Op]) -> Arc<dyn RootKeyStore> + Send + Sync,
{
    fn select(&self, ops: &[Op]) -> Arc<dyn RootKeyStore> {
        self(ops)
    }
}

/// A selector that uses one store for everything.
#[derive(Clone)]
pub struct SingleStore(pub Arc<dyn RootKeyStore>);

impl KeyStoreSelector for SingleStore {
    fn select(&self, _ops: &[Op]) -> Arc<dyn RootKeyStore> {
        Arc::clone(&self.0)
    }
}

/// Construction parameters for an [`Oven`].
#[derive(Default)]
pub struct OvenParams {
    /// Location stamped on every minted macaroon.
    pub location: String,
    /// Root-key store selection. Defaults to one in-memory store.
    pub root_key_store_for_ops: Option<Arc<dyn KeyStoreSelector>>,
    /// Where large operation sets are kept. Without one, every operation is
    /// embedded in the identifier.
    pub ops_store: Option<Arc<dyn OpsStore>>,
    /// Operation implied by identifiers that carry none. Defaults to the
    /// login operation.
    pub legacy_macaroon_op: Option<Op>,
}

/// What a verified macaroon grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacaroonOps {
    /// The operations the macaroon was minted for.
    pub ops: Vec<Op>,
    /// First-party caveat conditions, in order, for the caller to check.
    pub conditions: Vec<String>,
}

/// Mints macaroons for operation sets and recovers the operations from
/// presented macaroons.
#[derive(Clone)]
pub struct Oven {
    location: String,
    selector: Arc<dyn KeyStoreSelector>,
    ops_store: Option<Arc<dyn OpsStore>>,
    legacy_op: Op,
}

impl Oven {
    /// Create an oven from its parameters, filling in defaults.
    #[must_use]
    pub fn new(params: OvenParams) -> Self {
        let selector = params.root_key_store_for_ops.unwrap_or_else(|| {
            let store: Arc<dyn RootKeyStore> = Arc::new(MemRootKeyStore::new());
            Arc::new(SingleStore(store))
        });
        Self {
            location: params.location,
            selector,
            ops_store: params.ops_store,
            legacy_op: params.legacy_macaroon_op.unwrap_or_else(Op::login),
        }
    }

    /// Location stamped on minted macaroons.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Operation implied by identifiers that carry none.
    #[must_use]
    pub fn legacy_macaroon_op(&self) -> &Op {
        &self.legacy_op
    }

    /// Mint a macaroon granting `ops` until `expiry`.
    ///
    /// The macaroon carries a `time-before` caveat for `expiry` followed by
    /// `caveats`.
    ///
    /// # Errors
    ///
    /// Returns [`OvenError::NoOperations`] or [`OvenError::LoginOpCombined`]
    /// for unacceptable operation sets, and the store's error if no root key
    /// can be obtained or the operation set cannot be stored.
    pub async fn new_macaroon(
        &self,
        version: Version,
        expiry: DateTime<Utc>,
        caveats: &[Caveat],
        ops: &[Op],
    ) -> OvenResult<Macaroon> {
        if ops.is_empty() {
            return Err(OvenError::NoOperations);
        }
        let ops = canonical_ops(ops);
        if ops.len() > 1 && ops.iter().any(Op::is_login) {
            return Err(OvenError::LoginOpCombined);
        }

        let (secret, storage_id) = self
            .selector
            .select(&ops)
            .root_key()
            .await
            .map_err(OvenError::RootKey)?;

        let embedded = match &self.ops_store {
            Some(ops_store) if ops.len() > 1 => {
                let reference = ops_entity(&ops);
                ops_store
                    .put_ops(&reference, &ops, expiry)
                    .await
                    .map_err(OvenError::OpsStore)?;
                debug!(reference = %reference, count = ops.len(), "stored operation set");
                vec![Op::new(reference, MULTI_OP_ACTION)]
            },
            _ => ops,
        };

        let id = MacaroonId::V3 {
            nonce: Uuid::new_v4().as_bytes().to_vec(),
            storage_id,
            ops: embedded,
        };
        let macaroon_version = version.macaroon_version();
        let mut raw = id.to_bytes();
        if macaroon_version == MacaroonVersion::V1 {
            raw = URL_SAFE_NO_PAD.encode(raw).into_bytes();
        }

        let mut macaroon = Macaroon::new(&secret, raw, self.location.clone(), macaroon_version)
            .map_err(OvenError::Macaroon)?;
        macaroon
            .add_caveat(Caveat::time_before(expiry))
            .map_err(OvenError::Macaroon)?;
        for caveat in caveats {
            macaroon
                .add_caveat(caveat.clone())
                .map_err(OvenError::Macaroon)?;
        }
        Ok(macaroon)
    }

    /// Verify a presented macaroon and report what it grants.
    ///
    /// `macaroons` is the primary macaroon followed by any discharges;
    /// discharges are not supported.
    ///
    /// # Errors
    ///
    /// Returns [`OvenError::Verification`] if the macaroon is unusable for
    /// any reason, and other variants for operational failures of the
    /// root-key or ops stores.
    pub async fn macaroon_ops(&self, macaroons: &[Macaroon]) -> OvenResult<MacaroonOps> {
        let (primary, discharges) = macaroons
            .split_first()
            .ok_or(VerificationError::NoMacaroons)?;
        if !discharges.is_empty() {
            return Err(VerificationError::DischargesUnsupported.into());
        }

        let id = MacaroonId::decode(primary.id()).map_err(VerificationError::Decode)?;
        let ops = match id.ops() {
            Some(ops) => self.resolve_ops(ops).await?,
            None => vec![self.legacy_op.clone()],
        };

        let secret = match self.selector.select(&ops).get(id.storage_id()).await {
            Ok(secret) => secret,
            Err(e) if e.is_not_found() => {
                debug!(
                    storage_id = %String::from_utf8_lossy(id.storage_id()),
                    "macaroon root key not found"
                );
                return Err(VerificationError::KeyNotFound.into());
            },
            Err(e) => return Err(OvenError::RootKey(e)),
        };

        let conditions = primary
            .verify_signature(&secret)
            .map_err(VerificationError::Signature)?;
        Ok(MacaroonOps { ops, conditions })
    }

    async fn resolve_ops(&self, ops: &[Op]) -> OvenResult<Vec<Op>> {
        let [op] = ops else {
            return Ok(ops.to_vec());
        };
        if !is_multi_op_entity(&op.entity) {
            return Ok(ops.to_vec());
        }
        let Some(ops_store) = &self.ops_store else {
            return Err(VerificationError::OpsNotFound.into());
        };
        match ops_store.get_ops(&op.entity).await {
            Ok(ops) => Ok(ops),
            Err(e) if e.is_not_found() => Err(VerificationError::OpsNotFound.into()),
            Err(e) => Err(OvenError::OpsStore(e)),
        }
    }
}

impl std::fmt::Debug for Oven {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oven")
            .field("location", &self.location)
            .field("legacy_op", &self.legacy_op)
            .field("has_ops_store", &self.ops_store.is_some())
            .finish_non_exhaustive()
    }
}
