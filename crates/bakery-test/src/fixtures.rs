//! Test fixtures for common types.

use std::time::Duration;

use bakery_core::time::saturating_add;
use bakery_core::{Op, Policy, RootKey};
use chrono::{DateTime, Utc};

/// A fixed, arbitrary starting instant (2025-01-01T00:00:00Z).
#[must_use]
pub fn test_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
}

/// One-minute generate interval, one-hour expiry.
#[must_use]
pub fn test_policy() -> Policy {
    Policy::new(Duration::from_secs(60), Duration::from_secs(3_600))
}

/// A key with a recognisable secret, timestamps given as seconds after
/// [`test_epoch`].
#[must_use]
pub fn test_root_key(id: &str, created_secs: u64, expires_secs: u64) -> RootKey {
    let epoch = test_epoch();
    RootKey {
        id: id.as_bytes().to_vec(),
        created: saturating_add(epoch, Duration::from_secs(created_secs)),
        expires: saturating_add(epoch, Duration::from_secs(expires_secs)),
        secret: format!("secret-{id}").into_bytes(),
    }
}

/// A small operation set spanning two entities.
#[must_use]
pub fn test_ops() -> Vec<Op> {
    vec![
        Op::new("document-1", "read"),
        Op::new("document-1", "write"),
        Op::new("document-2", "read"),
    ]
}
