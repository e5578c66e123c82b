// Path: crates/drp-codec/src/hash.rs
//! Deterministic content-hashing for hash-graph vertices.
//!
//! A vertex's hash is the identity the rest of the graph addresses it
//! by (dependency edges, the frontier, LCA computation all reference
//! vertices by hash), so it must be a pure function of the vertex's
//! causally-relevant fields and nothing else — not of arrival order,
//! not of any local clock.

use sha2::{Digest, Sha256};

use crate::value::Value;

/// The sentinel hash of the hash-graph's synthetic root vertex. No real
/// vertex can produce this hash because it never encodes a `peer_id` of
/// empty string paired with a zero timestamp and zero dependencies
/// through [`compute_vertex_hash`] — it is reserved and injected
/// directly by the graph on construction.
pub const ROOT_HASH: &str = "rootHash";

/// Computes the content hash of a vertex from its causally-relevant
/// fields, returned as a lowercase hex string.
///
/// The hash covers `{ drp_type, operation_type, operation_value,
/// dependencies, peer_id, timestamp }`, canonically encoded so that two
/// peers constructing the same vertex always agree on its hash
/// regardless of incidental field ordering in their local
/// representation.
#[allow(clippy::too_many_arguments)]
pub fn compute_vertex_hash(
    drp_type: &str,
    operation_type: &str,
    operation_value: &[Value],
    dependencies: &[String],
    peer_id: &str,
    timestamp: u64,
) -> String {
    let deps = Value::List(
        dependencies
            .iter()
            .map(|d| Value::Str(d.clone()))
            .collect(),
    );
    let tuple = Value::Map(vec![
        (Value::Str("drpType".into()), Value::Str(drp_type.into())),
        (
            Value::Str("operationType".into()),
            Value::Str(operation_type.into()),
        ),
        (
            Value::Str("operationValue".into()),
            Value::List(operation_value.to_vec()),
        ),
        (Value::Str("dependencies".into()), deps),
        (Value::Str("peerId".into()), Value::Str(peer_id.into())),
        (Value::Str("timestamp".into()), Value::UInt(timestamp)),
    ]);

    let mut hasher = Sha256::new();
    hasher.update(tuple.encode_canonical());
    hex::encode(hasher.finalize())
}
