//! Macaroon error types.

use thiserror::Error;

/// Errors from building or verifying a macaroon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacaroonError {
    /// The signature does not match the root key and caveat chain.
    #[error("macaroon signature mismatch")]
    SignatureMismatch,

    /// A version 1 macaroon was given an identifier that is not UTF-8 text.
    #[error("version 1 macaroon identifier must be text")]
    NonTextId,

    /// The root key is empty.
    #[error("empty root key")]
    EmptyRootKey,

    /// A caveat condition is empty.
    #[error("empty caveat condition")]
    EmptyCondition,
}

/// Result type for macaroon operations.
pub type MacaroonResult<T> = Result<T, MacaroonError>;
