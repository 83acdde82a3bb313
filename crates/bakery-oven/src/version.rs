//! Bakery protocol versions.

use bakery_macaroon::MacaroonVersion;

/// The bakery protocol version a macaroon is minted for.
///
/// Every version mints the same version 3 identifier; the version only
/// decides the macaroon format and therefore whether the identifier must be
/// text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    /// Text-only macaroons; identifiers are base64url encoded.
    V1,
    /// Binary macaroons.
    V2,
    /// Binary macaroons with operations in the identifier.
    #[default]
    V3,
}

impl Version {
    /// The newest version.
    pub const LATEST: Self = Self::V3;

    /// The macaroon format used by this version.
    #[must_use]
    pub fn macaroon_version(self) -> MacaroonVersion {
        match self {
            Self::V1 => MacaroonVersion::V1,
            Self::V2 | Self::V3 => MacaroonVersion::V2,
        }
    }

    /// Look a version up by number.
    #[must_use]
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }
}
