//! Bakery Core - value types shared by the root-key cache and the oven.
//!
//! This crate provides:
//! - [`RootKey`]: a stored signing secret with its lifetime
//! - [`Policy`]: the temporal rule deciding when a key may be reused
//! - [`Op`]: an `(entity, action)` capability
//! - [`Clock`]: an injectable time source
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use bakery_core::{Clock, Policy, RootKey, SystemClock};
//!
//! let policy = Policy::new(Duration::from_secs(60), Duration::from_secs(3600));
//! let now = SystemClock.now();
//!
//! let key = RootKey::generate(now, policy.lifetime());
//! assert!(key.is_valid_with_policy(&policy, now));
//! assert!(!RootKey::default().is_valid());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;
pub mod time;

mod clock;
mod op;
mod policy;
mod root_key;

pub use clock::{Clock, SystemClock};
pub use op::{LOGIN, Op};
pub use policy::{KeyWindow, Policy};
pub use root_key::{ID_SEED_LEN, RootKey, SECRET_LEN};
