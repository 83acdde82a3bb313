//! Operation-set canonicalisation and content-addressed references.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bakery_core::Op;
use sha2::{Digest, Sha256};

/// Entity prefix marking a reference to an operation set held in an
/// [`OpsStore`](bakery_storage::OpsStore).
pub const MULTI_OP_PREFIX: &str = "multi-";

/// Action of the single op that stands in for a stored operation set.
pub const MULTI_OP_ACTION: &str = "*";

/// Sort by `(entity, action)` and drop duplicates.
///
/// The result is the same for any permutation of `ops`, and canonicalising
/// twice changes nothing.
#[must_use]
pub fn canonical_ops(ops: &[Op]) -> Vec<Op> {
    let mut ops = ops.to_vec();
    ops.sort();
    ops.dedup();
    ops
}

/// The reference under which a canonical operation set is stored.
///
/// `"multi-"` followed by the unpadded base64url SHA-256 of one
/// `action\nentity\n` record per op.
#[must_use]
pub fn ops_entity(ops: &[Op]) -> String {
    let mut hasher = Sha256::new();
    for op in ops {
        hasher.update(op.action.as_bytes());
        hasher.update(b"\n");
        hasher.update(op.entity.as_bytes());
        hasher.update(b"\n");
    }
    format!("{MULTI_OP_PREFIX}{}", URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

/// Whether `entity` is an operation-set reference.
#[must_use]
pub fn is_multi_op_entity(entity: &str) -> bool {
    entity.starts_with(MULTI_OP_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(pairs: &[(&str, &str)]) -> Vec<Op> {
        pairs.iter().map(|(e, a)| Op::new(*e, *a)).collect()
    }

    #[test]
    fn test_canonical_ops_sorts_and_dedupes() {
        let input = ops(&[("b", "read"), ("a", "write"), ("a", "read"), ("b", "read")]);
        assert_eq!(
            canonical_ops(&input),
            ops(&[("a", "read"), ("a", "write"), ("b", "read")])
        );
    }

    #[test]
    fn test_canonical_ops_is_idempotent_and_order_free() {
        let forward = ops(&[("x", "1"), ("y", "2"), ("x", "0")]);
        let mut backward = forward.clone();
        backward.reverse();

        let once = canonical_ops(&forward);
        assert_eq!(canonical_ops(&once), once);
        assert_eq!(canonical_ops(&backward), once);
    }

    #[test]
    fn test_ops_entity_is_stable_and_sensitive() {
        let a = canonical_ops(&ops(&[("doc", "read"), ("doc", "write")]));
        let b = canonical_ops(&ops(&[("doc", "write"), ("doc", "read"), ("doc", "read")]));
        assert_eq!(ops_entity(&a), ops_entity(&b));

        let changed = canonical_ops(&ops(&[("doc", "read"), ("doc", "writ")]));
        assert_ne!(ops_entity(&a), ops_entity(&changed));

        let entity = ops_entity(&a);
        assert!(is_multi_op_entity(&entity));
        // 32-byte digest, unpadded base64.
        assert_eq!(entity.len(), MULTI_OP_PREFIX.len() + 43);
        assert!(!entity.contains('='));
    }

    #[test]
    fn test_ops_entity_known_vector() {
        // base64url(sha256("read\ndoc\nwrite\ndoc\n")), unpadded.
        let set = canonical_ops(&ops(&[("doc", "write"), ("doc", "read")]));
        assert_eq!(
            ops_entity(&set),
            "multi-PZs7y3PL0gkkkdVaZJ0A-uZtHr-X2hW0eOurIo2Wan8"
        );
    }

    #[test]
    fn test_record_boundaries_matter() {
        // Identical without the record separators.
        let a = ops(&[("ab", "c")]);
        let b = ops(&[("b", "ca")]);
        assert_ne!(ops_entity(&a), ops_entity(&b));
    }
}
