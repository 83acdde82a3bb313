//! Bakery Macaroon - bearer tokens with a chained signature.
//!
//! A deliberately small first-party macaroon: an identifier, a location
//! hint, an ordered list of caveat conditions and a 32-byte signature chained
//! over all of them with BLAKE3 keyed hashing. Third-party caveats and
//! discharge macaroons are not supported.
//!
//! ```
//! use bakery_macaroon::{Caveat, Macaroon, MacaroonVersion};
//!
//! let root_key = b"a secret root key of 24 b";
//! let mut m = Macaroon::new(root_key, b"id".to_vec(), "svc", MacaroonVersion::V2).unwrap();
//! m.add_caveat(Caveat::first_party("declared user alice")).unwrap();
//!
//! assert_eq!(m.verify_signature(root_key).unwrap(), vec!["declared user alice"]);
//! assert!(m.verify_signature(b"wrong").is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod caveat;
mod error;
mod macaroon;

pub use caveat::{COND_TIME_BEFORE, Caveat};
pub use error::{MacaroonError, MacaroonResult};
pub use macaroon::{Macaroon, MacaroonVersion, SIGNATURE_LEN};
