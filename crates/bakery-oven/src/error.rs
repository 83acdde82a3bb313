//! Oven error types.

use bakery_macaroon::MacaroonError;
use bakery_rootkeys::RootKeyError;
use bakery_storage::StorageError;
use thiserror::Error;

/// Why a macaroon identifier could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The identifier is empty.
    #[error("empty macaroon id")]
    Empty,

    /// A version 2 identifier is shorter than its nonce.
    #[error("version 2 macaroon id too short")]
    TruncatedV2,

    /// A version 3 identifier body is not a valid message.
    #[error("malformed version 3 macaroon id: {0}")]
    Malformed(&'static str),

    /// A version 3 identifier carries no operations, or an entity without
    /// actions.
    #[error("no operations found in macaroon")]
    NoOperations,

    /// A legacy text identifier has no storage id component.
    #[error("legacy macaroon id has no storage id")]
    MissingStorageId,

    /// The identifier matches no known format.
    #[error("unrecognised macaroon id format")]
    UnknownFormat,
}

/// Why a macaroon was rejected.
///
/// Every variant means "this credential is unusable", as opposed to an
/// operational failure.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// No macaroons were presented.
    #[error("no macaroons in stack")]
    NoMacaroons,

    /// Discharge macaroons were presented; third-party caveats are not
    /// supported.
    #[error("discharge macaroons are not supported")]
    DischargesUnsupported,

    /// The identifier could not be decoded.
    #[error("invalid macaroon id: {0}")]
    Decode(#[from] DecodeError),

    /// The root key the macaroon names does not exist or has expired.
    #[error("macaroon not found in storage")]
    KeyNotFound,

    /// The operation set the macaroon references does not exist or has
    /// expired.
    #[error("operations for macaroon not found")]
    OpsNotFound,

    /// The signature chain does not verify.
    #[error("invalid macaroon signature: {0}")]
    Signature(#[source] MacaroonError),
}

/// Errors from minting or decoding macaroons.
#[derive(Debug, Error)]
pub enum OvenError {
    /// Minting was asked for an empty operation set.
    #[error("cannot mint a macaroon with no operations")]
    NoOperations,

    /// The login operation was combined with other operations.
    #[error("the login operation cannot be combined with other operations")]
    LoginOpCombined,

    /// The root-key store failed.
    #[error("cannot get root key: {0}")]
    RootKey(#[source] RootKeyError),

    /// The ops store failed.
    #[error("ops store error: {0}")]
    OpsStore(#[source] StorageError),

    /// The macaroon could not be built.
    #[error("cannot create macaroon: {0}")]
    Macaroon(#[source] MacaroonError),

    /// The oven was configured inconsistently.
    #[error("invalid oven configuration: {0}")]
    Config(String),

    /// The presented macaroon is not acceptable.
    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),
}

impl OvenError {
    /// Whether this error rejects the credential rather than reporting an
    /// operational failure.
    #[must_use]
    pub fn is_verification(&self) -> bool {
        matches!(self, Self::Verification(_))
    }
}

/// Result type for oven operations.
pub type OvenResult<T> = Result<T, OvenError>;
