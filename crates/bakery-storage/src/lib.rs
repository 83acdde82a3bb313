//! Bakery Storage - contracts for durable key and operation storage.
//!
//! The root-key cache and the oven sit in front of two slow, durable
//! collaborators. This crate defines them at their interface boundary:
//!
//! # [`Backing`]
//!
//! Durable storage of [`RootKey`](bakery_core::RootKey) rows. The cache asks
//! it for a key by id, for the newest key inside a policy window, and to
//! insert freshly generated keys. Physical expiry of rows (e.g. a TTL index)
//! is the backing's own business.
//!
//! # [`OpsStore`]
//!
//! Durable storage of large operation sets, referenced from a macaroon by a
//! content hash instead of being embedded in it.
//!
//! # Implementations
//!
//! | Type | Notes |
//! |------|-------|
//! | [`MemoryBacking`] | In-process rows, for tests and single-node use |
//! | [`MemoryOpsStore`] | In-process op sets with expiry on read |
//!
//! SQL / document-store adapters live outside this workspace; they only need
//! to honour the trait contracts documented here.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod backing;
pub mod error;
pub mod ops_store;

pub use backing::{Backing, MemoryBacking};
pub use error::{StorageError, StorageResult};
pub use ops_store::{MemoryOpsStore, OpsStore};
