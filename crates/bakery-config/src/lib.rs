#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! TOML configuration for bakery services.
//!
//! ```toml
//! [cache]
//! max_cache_size = 1000
//!
//! [oven]
//! location = "https://auth.example.com"
//! policy = "default"
//! version = 3
//!
//! [oven.routes]
//! "admin-" = "short"
//!
//! [policies.default]
//! generate_interval_secs = 3600
//! expiry_secs = 86400
//!
//! [policies.short]
//! generate_interval_secs = 60
//! expiry_secs = 600
//! ```
//!
//! This crate has no dependencies on other bakery crates. Conversion into
//! domain types happens in `bakery-oven` behind its `config` feature.

mod error;
mod loader;
pub mod types;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::{
    BakeryConfig, CacheSection, DEFAULT_POLICY_NAME, LoggingSection, OpSection, OvenSection,
    PolicySection,
};
