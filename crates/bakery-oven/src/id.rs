//! Macaroon identifiers.
//!
//! Three generations of identifier are accepted:
//!
//! | Form | Layout | Operations |
//! |------|--------|------------|
//! | legacy | `<storage id>-<suffix>` text, lowercase hex first | the legacy op |
//! | version 2 | `0x02`, 16-byte nonce, storage id | the legacy op |
//! | version 3 | `0x03`, protobuf `MacaroonId` | embedded |
//!
//! Binary forms may arrive base64url encoded (no padding), in which case the
//! text starts with `'A'`, the encoding of the version byte's top bits.
//!
//! ```text
//! message MacaroonId { bytes nonce = 1; bytes storage_id = 2; repeated Op ops = 3; }
//! message Op         { string entity = 1; repeated string actions = 2; }
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bakery_core::Op;

use crate::error::DecodeError;
use crate::proto::{self, Reader, WIRE_LEN};

/// Length of the nonce in version 2 and freshly minted version 3 ids.
pub const NONCE_LEN: usize = 16;

const VERSION_2: u8 = 2;
const VERSION_3: u8 = 3;

const FIELD_NONCE: u64 = 1;
const FIELD_STORAGE_ID: u64 = 2;
const FIELD_OPS: u64 = 3;
const FIELD_OP_ENTITY: u64 = 1;
const FIELD_OP_ACTIONS: u64 = 2;

/// A decoded macaroon identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacaroonId {
    /// Hyphen-delimited text from the first bakery version.
    Legacy {
        /// Everything before the last hyphen.
        storage_id: Vec<u8>,
        /// Everything after it.
        suffix: Vec<u8>,
    },
    /// Version byte 2: fixed-size nonce, then the storage id.
    V2 {
        /// Per-macaroon random bytes.
        nonce: [u8; NONCE_LEN],
        /// Root-key id.
        storage_id: Vec<u8>,
    },
    /// Version byte 3: protobuf body with embedded operations.
    V3 {
        /// Per-macaroon random bytes.
        nonce: Vec<u8>,
        /// Root-key id.
        storage_id: Vec<u8>,
        /// Operations in stored order.
        ops: Vec<Op>,
    },
}

impl MacaroonId {
    /// The id of the root key the macaroon was signed with.
    #[must_use]
    pub fn storage_id(&self) -> &[u8] {
        match self {
            Self::Legacy { storage_id, .. }
            | Self::V2 { storage_id, .. }
            | Self::V3 { storage_id, .. } => storage_id,
        }
    }

    /// Operations carried by the id; `None` for forms that carry none.
    #[must_use]
    pub fn ops(&self) -> Option<&[Op]> {
        match self {
            Self::V3 { ops, .. } => Some(ops),
            Self::Legacy { .. } | Self::V2 { .. } => None,
        }
    }

    /// The raw binary (or, for legacy ids, text) encoding.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Legacy { storage_id, suffix } => {
                let mut out = storage_id.clone();
                out.push(b'-');
                out.extend_from_slice(suffix);
                out
            },
            Self::V2 { nonce, storage_id } => {
                let mut out = vec![VERSION_2];
                out.extend_from_slice(nonce);
                out.extend_from_slice(storage_id);
                out
            },
            Self::V3 {
                nonce,
                storage_id,
                ops,
            } => {
                let mut out = vec![VERSION_3];
                proto::put_bytes_field(&mut out, FIELD_NONCE, nonce);
                proto::put_bytes_field(&mut out, FIELD_STORAGE_ID, storage_id);
                for (entity, actions) in group_by_entity(ops) {
                    let mut op = Vec::new();
                    proto::put_bytes_field(&mut op, FIELD_OP_ENTITY, entity.as_bytes());
                    for action in actions {
                        proto::put_repeated_field(&mut op, FIELD_OP_ACTIONS, action.as_bytes());
                    }
                    proto::put_repeated_field(&mut out, FIELD_OPS, &op);
                }
                out
            },
        }
    }

    /// Decode an identifier taken from an untrusted macaroon.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] describing the first problem found.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let first = *raw.first().ok_or(DecodeError::Empty)?;
        if first == b'A'
            && let Ok(decoded) = URL_SAFE_NO_PAD.decode(raw)
        {
            return match decoded.split_first() {
                Some((&VERSION_2, body)) => decode_v2(body),
                Some((&VERSION_3, body)) => decode_v3(body),
                Some(_) => Err(DecodeError::UnknownFormat),
                None => Err(DecodeError::Empty),
            };
        }
        match first {
            VERSION_2 => decode_v2(&raw[1..]),
            VERSION_3 => decode_v3(&raw[1..]),
            b'0'..=b'9' | b'a'..=b'f' => decode_legacy(raw),
            _ => Err(DecodeError::UnknownFormat),
        }
    }
}

fn decode_legacy(raw: &[u8]) -> Result<MacaroonId, DecodeError> {
    let hyphen = raw
        .iter()
        .rposition(|&b| b == b'-')
        .ok_or(DecodeError::MissingStorageId)?;
    let (storage_id, suffix) = raw.split_at(hyphen);
    Ok(MacaroonId::Legacy {
        storage_id: storage_id.to_vec(),
        suffix: suffix.get(1..).unwrap_or_default().to_vec(),
    })
}

fn decode_v2(body: &[u8]) -> Result<MacaroonId, DecodeError> {
    let (nonce, storage_id) = body
        .split_first_chunk::<NONCE_LEN>()
        .ok_or(DecodeError::TruncatedV2)?;
    Ok(MacaroonId::V2 {
        nonce: *nonce,
        storage_id: storage_id.to_vec(),
    })
}

fn decode_v3(body: &[u8]) -> Result<MacaroonId, DecodeError> {
    let mut nonce = Vec::new();
    let mut storage_id = Vec::new();
    let mut ops = Vec::new();

    let mut reader = Reader::new(body);
    while !reader.is_empty() {
        match reader.read_key()? {
            (FIELD_NONCE, WIRE_LEN) => nonce = reader.read_len_delimited()?.to_vec(),
            (FIELD_STORAGE_ID, WIRE_LEN) => storage_id = reader.read_len_delimited()?.to_vec(),
            (FIELD_OPS, WIRE_LEN) => {
                let (entity, actions) = decode_op(reader.read_len_delimited()?)?;
                if actions.is_empty() {
                    return Err(DecodeError::NoOperations);
                }
                ops.extend(actions.into_iter().map(|action| Op::new(entity.clone(), action)));
            },
            (FIELD_NONCE | FIELD_STORAGE_ID | FIELD_OPS, _) => {
                return Err(DecodeError::Malformed("unexpected wire type"));
            },
            (_, wire_type) => reader.skip(wire_type)?,
        }
    }

    if ops.is_empty() {
        return Err(DecodeError::NoOperations);
    }
    Ok(MacaroonId::V3 {
        nonce,
        storage_id,
        ops,
    })
}

fn decode_op(body: &[u8]) -> Result<(String, Vec<String>), DecodeError> {
    let mut entity = String::new();
    let mut actions = Vec::new();

    let mut reader = Reader::new(body);
    while !reader.is_empty() {
        match reader.read_key()? {
            (FIELD_OP_ENTITY, WIRE_LEN) => entity = utf8(reader.read_len_delimited()?)?,
            (FIELD_OP_ACTIONS, WIRE_LEN) => actions.push(utf8(reader.read_len_delimited()?)?),
            (FIELD_OP_ENTITY | FIELD_OP_ACTIONS, _) => {
                return Err(DecodeError::Malformed("unexpected wire type"));
            },
            (_, wire_type) => reader.skip(wire_type)?,
        }
    }
    Ok((entity, actions))
}

fn utf8(bytes: &[u8]) -> Result<String, DecodeError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::Malformed("string is not UTF-8"))
}

/// Group runs of consecutive ops with the same entity.
fn group_by_entity(ops: &[Op]) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for op in ops {
        if let Some((entity, actions)) = groups.last_mut()
            && *entity == op.entity
        {
            actions.push(op.action.as_str());
            continue;
        }
        groups.push((op.entity.as_str(), vec![op.action.as_str()]));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v3(ops: Vec<Op>) -> MacaroonId {
        MacaroonId::V3 {
            nonce: vec![7; NONCE_LEN],
            storage_id: b"0123abcd".to_vec(),
            ops,
        }
    }

    #[test]
    fn test_v3_encoding_groups_entities() {
        let id = v3(vec![
            Op::new("a", "read"),
            Op::new("a", "write"),
            Op::new("b", "read"),
        ]);
        let bytes = id.to_bytes();

        let mut expected = vec![VERSION_3];
        expected.extend_from_slice(&[0x0a, 16]);
        expected.extend_from_slice(&[7; NONCE_LEN]);
        expected.extend_from_slice(&[0x12, 8]);
        expected.extend_from_slice(b"0123abcd");
        // Op { entity: "a", actions: ["read", "write"] }
        expected.extend_from_slice(&[0x1a, 16, 0x0a, 1, b'a', 0x12, 4]);
        expected.extend_from_slice(b"read");
        expected.extend_from_slice(&[0x12, 5]);
        expected.extend_from_slice(b"write");
        // Op { entity: "b", actions: ["read"] }
        expected.extend_from_slice(&[0x1a, 9, 0x0a, 1, b'b', 0x12, 4]);
        expected.extend_from_slice(b"read");
        assert_eq!(bytes, expected);

        assert_eq!(MacaroonId::decode(&bytes).unwrap(), id);
    }

    #[test]
    fn test_v3_base64_wrapped() {
        let id = v3(vec![Op::new("doc", "read")]);
        let text = URL_SAFE_NO_PAD.encode(id.to_bytes());
        assert!(text.starts_with('A'));
        assert_eq!(MacaroonId::decode(text.as_bytes()).unwrap(), id);
    }

    #[test]
    fn test_v3_empty_fields_are_omitted() {
        let id = MacaroonId::V3 {
            nonce: Vec::new(),
            storage_id: Vec::new(),
            ops: vec![Op::new("", "read")],
        };
        assert_eq!(id.to_bytes(), [VERSION_3, 0x1a, 6, 0x12, 4, b'r', b'e', b'a', b'd']);
        assert_eq!(MacaroonId::decode(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn test_v3_unknown_fields_are_skipped() {
        let mut bytes = v3(vec![Op::new("a", "read")]).to_bytes();
        // Field 9 varint, field 10 length-delimited.
        bytes.extend_from_slice(&[0x48, 0x01, 0x52, 0x02, b'h', b'i']);
        assert_eq!(
            MacaroonId::decode(&bytes).unwrap().ops().unwrap(),
            [Op::new("a", "read")]
        );
    }

    #[test]
    fn test_v3_without_ops_is_rejected() {
        assert_eq!(
            MacaroonId::decode(&v3(Vec::new()).to_bytes()).unwrap_err(),
            DecodeError::NoOperations
        );

        // An op with an entity but no actions.
        let bytes = [VERSION_3, 0x1a, 3, 0x0a, 1, b'a'];
        assert_eq!(
            MacaroonId::decode(&bytes).unwrap_err(),
            DecodeError::NoOperations
        );
    }

    #[test]
    fn test_v3_garbage_is_malformed() {
        let err = MacaroonId::decode(&[VERSION_3, 0x1a, 40, 0x0a]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));

        // Storage id sent as a varint.
        let err = MacaroonId::decode(&[VERSION_3, 0x10, 0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_v2_layout() {
        let mut bytes = vec![VERSION_2];
        bytes.extend_from_slice(&[9; NONCE_LEN]);
        bytes.extend_from_slice(b"key-id");

        let id = MacaroonId::decode(&bytes).unwrap();
        assert_eq!(id.storage_id(), b"key-id");
        assert!(id.ops().is_none());
        assert_eq!(id.to_bytes(), bytes);

        let wrapped = URL_SAFE_NO_PAD.encode(&bytes);
        assert_eq!(MacaroonId::decode(wrapped.as_bytes()).unwrap(), id);

        assert_eq!(
            MacaroonId::decode(&bytes[..NONCE_LEN]).unwrap_err(),
            DecodeError::TruncatedV2
        );
    }

    #[test]
    fn test_legacy_uses_last_hyphen() {
        let id = MacaroonId::decode(b"f00d-cafe-1234").unwrap();
        assert_eq!(id.storage_id(), b"f00d-cafe");
        assert_eq!(
            id,
            MacaroonId::Legacy {
                storage_id: b"f00d-cafe".to_vec(),
                suffix: b"1234".to_vec(),
            }
        );
        assert_eq!(id.to_bytes(), b"f00d-cafe-1234");
        assert!(id.ops().is_none());

        assert_eq!(
            MacaroonId::decode(b"deadbeef").unwrap_err(),
            DecodeError::MissingStorageId
        );
    }

    #[test]
    fn test_unrecognised_forms() {
        assert_eq!(MacaroonId::decode(b"").unwrap_err(), DecodeError::Empty);
        assert_eq!(
            MacaroonId::decode(b"Zzz-1").unwrap_err(),
            DecodeError::UnknownFormat
        );
        // 'A' that is not valid base64 is not legacy text either.
        assert_eq!(
            MacaroonId::decode(b"A!-1").unwrap_err(),
            DecodeError::UnknownFormat
        );
        // Valid base64 of a byte that is no version.
        assert_eq!(
            MacaroonId::decode(b"AAAA").unwrap_err(),
            DecodeError::UnknownFormat
        );
    }
}
