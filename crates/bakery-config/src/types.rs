//! Configuration types for a bakery service.
//!
//! Every section implements [`Default`], so a bare `[section]` header (or
//! no file at all) produces a working configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the policy present in the default configuration.
pub const DEFAULT_POLICY_NAME: &str = "default";

// ---------------------------------------------------------------------------
// Top-level BakeryConfig
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeryConfig {
    /// Root key cache sizing.
    pub cache: CacheSection,
    /// Macaroon minting and routing.
    pub oven: OvenSection,
    /// Named root key policies.
    pub policies: BTreeMap<String, PolicySection>,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

impl Default for BakeryConfig {
    fn default() -> Self {
        let mut policies = BTreeMap::new();
        policies.insert(DEFAULT_POLICY_NAME.to_owned(), PolicySection::default());
        Self {
            cache: CacheSection::default(),
            oven: OvenSection::default(),
            policies,
            logging: LoggingSection::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// CacheSection
// ---------------------------------------------------------------------------

/// Root key cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Entries per cache generation. The cache holds at most twice this.
    pub max_cache_size: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_cache_size: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// OvenSection
// ---------------------------------------------------------------------------

/// Oven configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvenSection {
    /// Location hint stamped on minted macaroons.
    pub location: String,
    /// Policy for operations that match no route.
    pub policy: String,
    /// Identifier format version for new macaroons (1, 2 or 3).
    pub version: u8,
    /// Entity prefix to policy name. The longest matching prefix wins.
    pub routes: BTreeMap<String, String>,
    /// Operation implied by legacy identifiers that carry none.
    pub legacy_op: Option<OpSection>,
}

impl Default for OvenSection {
    fn default() -> Self {
        Self {
            location: "bakery".to_owned(),
            policy: DEFAULT_POLICY_NAME.to_owned(),
            version: 3,
            routes: BTreeMap::new(),
            legacy_op: None,
        }
    }
}

/// An `(entity, action)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpSection {
    /// Entity name.
    pub entity: String,
    /// Action name.
    pub action: String,
}

// ---------------------------------------------------------------------------
// PolicySection
// ---------------------------------------------------------------------------

/// Root key lifecycle policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// How long a newly generated key is used for minting, in seconds.
    pub generate_interval_secs: u64,
    /// How long after creation a key must remain valid, in seconds.
    pub expiry_secs: u64,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            generate_interval_secs: 3600,
            expiry_secs: 86_400,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["bakery_rootkeys=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
