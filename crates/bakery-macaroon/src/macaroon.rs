//! The macaroon itself and its signature chain.
//!
//! ```text
//! k     = derive_key(CONTEXT, root_key)
//! sig_0 = keyed_hash(k, id)
//! sig_i = keyed_hash(sig_{i-1}, caveat_i)
//! ```
//!
//! Anyone holding a macaroon can append caveats; removing one requires the
//! root key.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::caveat::Caveat;
use crate::error::{MacaroonError, MacaroonResult};

/// Length of a macaroon signature in bytes.
pub const SIGNATURE_LEN: usize = 32;

const KEY_CONTEXT: &str = "bakery-macaroon 2024 root key";

/// Macaroon serialization format.
///
/// Version 1 macaroons can only carry text identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacaroonVersion {
    /// Original text-based format.
    V1,
    /// Binary format.
    V2,
}

/// A bearer token whose signature binds an identifier and a chain of
/// first-party caveats to a root key.
#[derive(Clone, PartialEq, Eq)]
pub struct Macaroon {
    version: MacaroonVersion,
    location: String,
    id: Vec<u8>,
    caveats: Vec<Caveat>,
    signature: [u8; SIGNATURE_LEN],
}

impl Macaroon {
    /// Mint a macaroon with no caveats.
    ///
    /// # Errors
    ///
    /// Returns [`MacaroonError::EmptyRootKey`] for an empty key and
    /// [`MacaroonError::NonTextId`] if a V1 macaroon is given a non-UTF-8 id.
    pub fn new(
        root_key: &[u8],
        id: Vec<u8>,
        location: impl Into<String>,
        version: MacaroonVersion,
    ) -> MacaroonResult<Self> {
        if root_key.is_empty() {
            return Err(MacaroonError::EmptyRootKey);
        }
        if version == MacaroonVersion::V1 && std::str::from_utf8(&id).is_err() {
            return Err(MacaroonError::NonTextId);
        }
        let signature = keyed_hash(&derive_key(root_key), &id);
        Ok(Self {
            version,
            location: location.into(),
            id,
            caveats: Vec::new(),
            signature,
        })
    }

    /// Append a first-party caveat, extending the signature chain.
    ///
    /// # Errors
    ///
    /// Returns [`MacaroonError::EmptyCondition`] if the condition is empty.
    pub fn add_caveat(&mut self, caveat: Caveat) -> MacaroonResult<()> {
        if caveat.condition().is_empty() {
            return Err(MacaroonError::EmptyCondition);
        }
        self.signature = keyed_hash(&self.signature, caveat.condition().as_bytes());
        self.caveats.push(caveat);
        Ok(())
    }

    /// Append a first-party caveat with the given condition.
    ///
    /// # Errors
    ///
    /// See [`add_caveat`](Self::add_caveat).
    pub fn add_first_party_caveat(&mut self, condition: impl Into<String>) -> MacaroonResult<()> {
        self.add_caveat(Caveat::first_party(condition))
    }

    /// Check the signature chain against `root_key` and return the caveat
    /// conditions for the caller to check.
    ///
    /// # Errors
    ///
    /// Returns [`MacaroonError::SignatureMismatch`] if the macaroon was not
    /// minted with `root_key` or has been tampered with.
    pub fn verify_signature(&self, root_key: &[u8]) -> MacaroonResult<Vec<String>> {
        if root_key.is_empty() {
            return Err(MacaroonError::EmptyRootKey);
        }
        let mut signature = Zeroizing::new(keyed_hash(&derive_key(root_key), &self.id));
        for caveat in &self.caveats {
            *signature = keyed_hash(&signature, caveat.condition().as_bytes());
        }
        if bool::from(signature.as_slice().ct_eq(self.signature.as_slice())) {
            Ok(self
                .caveats
                .iter()
                .map(|c| c.condition().to_owned())
                .collect())
        } else {
            Err(MacaroonError::SignatureMismatch)
        }
    }

    /// The serialization format.
    #[must_use]
    pub fn version(&self) -> MacaroonVersion {
        self.version
    }

    /// Hint naming the service that minted the macaroon.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The raw identifier.
    #[must_use]
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// Caveats in the order they were added.
    #[must_use]
    pub fn caveats(&self) -> &[Caveat] {
        &self.caveats
    }

    /// The current end of the signature chain.
    #[must_use]
    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }
}

impl std::fmt::Debug for Macaroon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Macaroon")
            .field("version", &self.version)
            .field("location", &self.location)
            .field("id", &String::from_utf8_lossy(&self.id))
            .field("caveats", &self.caveats)
            .field("signature", &hex::encode(&self.signature[..4]))
            .finish()
    }
}

fn derive_key(root_key: &[u8]) -> Zeroizing<[u8; SIGNATURE_LEN]> {
    Zeroizing::new(blake3::derive_key(KEY_CONTEXT, root_key))
}

fn keyed_hash(key: &[u8; SIGNATURE_LEN], message: &[u8]) -> [u8; SIGNATURE_LEN] {
    *blake3::keyed_hash(key, message).as_bytes()
}
