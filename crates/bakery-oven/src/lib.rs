//! Bakery Oven - minting and decoding macaroons.
//!
//! An [`Oven`] turns an operation set into a signed macaroon and turns a
//! presented macaroon back into the operations it grants:
//!
//! 1. operations are canonicalised (sorted, deduplicated);
//! 2. a [`KeyStoreSelector`] picks the root-key store for them, and the store
//!    hands out a `(secret, storage id)` pair;
//! 3. the storage id, a fresh nonce and the operations are packed into a
//!    versioned [`MacaroonId`]. Large operation sets go to an
//!    [`OpsStore`](bakery_storage::OpsStore) and the id carries a
//!    content-addressed reference instead;
//! 4. the macaroon is signed and given a `time-before` caveat.
//!
//! Verification reverses each step and returns the operations together with
//! the caveat conditions, which the caller checks.
//!
//! # Example
//!
//! ```rust,ignore
//! use bakery_core::Op;
//! use bakery_oven::{Oven, OvenParams, Version};
//!
//! let oven = Oven::new(OvenParams::default());
//! let expiry = chrono::Utc::now() + chrono::Duration::hours(1);
//! let m = oven
//!     .new_macaroon(Version::LATEST, expiry, &[], &[Op::new("doc-1", "read")])
//!     .await?;
//!
//! let granted = oven.macaroon_ops(&[m]).await?;
//! assert_eq!(granted.ops, vec![Op::new("doc-1", "read")]);
//! ```
//!
//! # Features
//!
//! - `config`: build an oven from a `bakery-config`
//!   [`BakeryConfig`](bakery_config::BakeryConfig).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

#[cfg(feature = "config")]
pub mod config;

mod error;
mod id;
mod ops;
mod oven;
mod proto;
mod selector;
mod version;

pub use error::{DecodeError, OvenError, OvenResult, VerificationError};
pub use id::{MacaroonId, NONCE_LEN};
pub use ops::{MULTI_OP_ACTION, MULTI_OP_PREFIX, canonical_ops, is_multi_op_entity, ops_entity};
pub use oven::{KeyStoreSelector, MacaroonOps, Oven, OvenParams, SingleStore};
pub use selector::RoutedSelector;
pub use version::Version;
