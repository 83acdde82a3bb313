//! Operations - the capabilities a macaroon grants.

use serde::{Deserialize, Serialize};

/// Entity and action of the reserved login operation.
pub const LOGIN: &str = "login";

/// A single capability: an action permitted on an entity.
///
/// Ordering is by `(entity, action)`, which is the canonical order used when
/// operations are embedded in or hashed for a macaroon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Op {
    /// The entity acted upon (e.g. `"doc-42"`).
    pub entity: String,
    /// The action performed (e.g. `"read"`).
    pub action: String,
}

impl Op {
    /// Create a new operation.
    #[must_use]
    pub fn new(entity: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            action: action.into(),
        }
    }

    /// The reserved login operation.
    ///
    /// It is never combined with other operations in one macaroon and is the
    /// implied capability of identifiers that carry no operations.
    #[must_use]
    pub fn login() -> Self {
        Self::new(LOGIN, LOGIN)
    }

    /// Whether this is the reserved login operation.
    #[must_use]
    pub fn is_login(&self) -> bool {
        self.entity == LOGIN && self.action == LOGIN
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity, self.action)
    }
}
