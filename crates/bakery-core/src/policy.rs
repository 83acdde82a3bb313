//! Root-key reuse policy.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::root_key::RootKey;
use crate::time::{saturating_add, saturating_sub};

/// Governs when an existing root key may be reused and when a new one must
/// be generated.
///
/// A key handed out at time `t` under a policy is guaranteed to stay valid
/// for at least `expiry_duration`, and was generated no more than
/// `generate_interval` before `t`.
///
/// Policies are plain values and are used as map keys by the root-key cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Policy {
    generate_interval: Duration,
    expiry_duration: Duration,
}

impl Policy {
    /// Create a policy.
    ///
    /// A zero `generate_interval` defaults to `expiry_duration`.
    #[must_use]
    pub const fn new(generate_interval: Duration, expiry_duration: Duration) -> Self {
        let generate_interval = if generate_interval.is_zero() {
            expiry_duration
        } else {
            generate_interval
        };
        Self {
            generate_interval,
            expiry_duration,
        }
    }

    /// How often a new key is generated.
    #[must_use]
    pub const fn generate_interval(&self) -> Duration {
        self.generate_interval
    }

    /// Minimum remaining lifetime of a key handed out under this policy.
    #[must_use]
    pub const fn expiry_duration(&self) -> Duration {
        self.expiry_duration
    }

    /// Total lifetime given to a freshly generated key.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.expiry_duration.saturating_add(self.generate_interval)
    }

    /// The acceptance window for keys at `now`.
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>) -> KeyWindow {
        let expires_after = saturating_add(now, self.expiry_duration);
        KeyWindow {
            created_after: saturating_sub(now, self.generate_interval),
            expires_after,
            expires_before: saturating_add(expires_after, self.generate_interval),
        }
    }
}

/// The three bounds a key must satisfy to be usable under a policy at a
/// given instant. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyWindow {
    /// Oldest acceptable creation time.
    pub created_after: DateTime<Utc>,
    /// Earliest acceptable expiry.
    pub expires_after: DateTime<Utc>,
    /// Latest acceptable expiry.
    pub expires_before: DateTime<Utc>,
}

impl KeyWindow {
    /// Whether `key`'s timestamps fall inside this window.
    ///
    /// This checks timestamps only; see [`RootKey::is_valid_with_policy`]
    /// for the full check including the absent sentinel.
    #[must_use]
    pub fn admits(&self, key: &RootKey) -> bool {
        key.created >= self.created_after
            && key.expires >= self.expires_after
            && key.expires <= self.expires_before
    }
}
