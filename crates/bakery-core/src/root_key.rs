//! Root keys - the secrets macaroons are signed with.
//!
//! A root key never leaves the server. Macaroons carry only the key's
//! storage id, which is looked up again at verification time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::policy::Policy;
use crate::time::saturating_add;

/// Length of a generated root-key secret in bytes.
pub const SECRET_LEN: usize = 24;

/// Number of random bytes behind a generated key id (hex encoded, so the
/// id itself is twice as long).
pub const ID_SEED_LEN: usize = 16;

/// A root key as stored by a backing store.
///
/// The zero value (`RootKey::default()`) is the canonical "absent" key: a
/// key is valid only when its secret is non-empty.
///
/// The id and secret are zeroized on drop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct RootKey {
    /// Storage id, unique among the non-expired keys of a backing store.
    pub id: Vec<u8>,
    /// When the key was generated.
    #[zeroize(skip)]
    pub created: DateTime<Utc>,
    /// When the key stops being usable.
    #[zeroize(skip)]
    pub expires: DateTime<Utc>,
    /// The signing secret.
    pub secret: Vec<u8>,
}

impl RootKey {
    /// Generate a fresh random key created at `now` and living for `lifetime`.
    ///
    /// The secret is [`SECRET_LEN`] random bytes; the id is [`ID_SEED_LEN`]
    /// random bytes, hex encoded.
    #[must_use]
    pub fn generate(now: DateTime<Utc>, lifetime: Duration) -> Self {
        let mut secret = vec![0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut secret);

        let mut seed = [0u8; ID_SEED_LEN];
        OsRng.fill_bytes(&mut seed);

        Self {
            id: hex::encode(seed).into_bytes(),
            created: now,
            expires: saturating_add(now, lifetime),
            secret,
        }
    }

    /// Whether this is a real key rather than the absent sentinel.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Whether the key has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }

    /// Whether the key may be handed out under `policy` at `now`.
    ///
    /// Always false for the absent sentinel.
    #[must_use]
    pub fn is_valid_with_policy(&self, policy: &Policy, now: DateTime<Utc>) -> bool {
        self.is_valid() && policy.window(now).admits(self)
    }

    /// The id rendered for logs.
    #[must_use]
    pub fn id_display(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

impl std::fmt::Debug for RootKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootKey")
            .field("id", &self.id_display())
            .field("created", &self.created)
            .field("expires", &self.expires)
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn key(created: i64, expires: i64) -> RootKey {
        RootKey {
            id: b"id".to_vec(),
            created: at(created),
            expires: at(expires),
            secret: b"secret".to_vec(),
        }
    }

    #[test]
    fn test_generate() {
        let key = RootKey::generate(at(100), Duration::from_secs(50));
        assert!(key.is_valid());
        assert_eq!(key.secret.len(), SECRET_LEN);
        assert_eq!(key.id.len(), ID_SEED_LEN * 2);
        assert!(key.id.iter().all(u8::is_ascii_hexdigit));
        assert_eq!(key.created, at(100));
        assert_eq!(key.expires, at(150));

        let other = RootKey::generate(at(100), Duration::from_secs(50));
        assert_ne!(key.id, other.id);
        assert_ne!(key.secret, other.secret);
    }

    #[test]
    fn test_sentinel_is_never_valid() {
        let sentinel = RootKey::default();
        assert!(!sentinel.is_valid());

        let policy = Policy::new(Duration::from_secs(10), Duration::from_secs(100));
        // Even with timestamps that fit the window.
        let mut empty = key(995, 1_105);
        empty.secret.clear();
        assert!(!empty.is_valid_with_policy(&policy, at(1_000)));
        assert!(!sentinel.is_valid_with_policy(&policy, at(1_000)));
    }

    #[test]
    fn test_window_inequalities() {
        // now = 1000, gi = 10, ed = 100:
        // created >= 990, expires >= 1100, expires <= 1110
        let policy = Policy::new(Duration::from_secs(10), Duration::from_secs(100));
        let now = at(1_000);

        assert!(key(990, 1_100).is_valid_with_policy(&policy, now));
        assert!(key(1_000, 1_110).is_valid_with_policy(&policy, now));

        // Created too long ago.
        assert!(!key(989, 1_100).is_valid_with_policy(&policy, now));
        // Expires too soon.
        assert!(!key(995, 1_099).is_valid_with_policy(&policy, now));
        // Expires too late.
        assert!(!key(995, 1_111).is_valid_with_policy(&policy, now));
    }

    #[test]
    fn test_expiry() {
        let k = key(0, 100);
        assert!(!k.is_expired(at(100)));
        assert!(k.is_expired(at(101)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", key(0, 1));
        assert!(debug.contains("[redacted]"));
        // b"secret" as a byte list
        assert!(!debug.contains("115, 101"));
    }
}
