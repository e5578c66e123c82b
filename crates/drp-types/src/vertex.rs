// Path: crates/drp-types/src/vertex.rs
use serde::{Deserialize, Serialize};

use drp_codec::{compute_vertex_hash, ROOT_HASH};

use crate::operation::{DrpType, Operation};

fn drp_type_label(drp_type: DrpType) -> &'static str {
    match drp_type {
        DrpType::Acl => "acl",
        DrpType::Drp => "drp",
    }
}

/// A single signed entry in a hash graph.
///
/// `hash` is always the content hash of the remaining fields (see
/// [`Vertex::compute_hash`]) except for the synthetic root, whose hash
/// is the fixed sentinel [`ROOT_HASH`] and which carries no operation
/// or signature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// This vertex's content hash, in lowercase hex (or [`ROOT_HASH`]).
    pub hash: String,
    /// The peer that authored this vertex. Empty for the root.
    pub peer_id: String,
    /// The mutation this vertex applies. `None` only for the root.
    pub operation: Option<Operation>,
    /// Hashes of this vertex's immediate causal predecessors.
    pub dependencies: Vec<String>,
    /// Milliseconds since the Unix epoch, as recorded by the author.
    pub timestamp: u64,
    /// A compact-with-recovery secp256k1 signature over the hash.
    /// Empty for the root.
    pub signature: Vec<u8>,
}

impl Vertex {
    /// Builds and hashes a new, unsigned vertex. Call [`Vertex::sign`]
    /// (in `drp-crypto`) to populate `signature` before submitting it.
    pub fn new(
        peer_id: impl Into<String>,
        operation: Operation,
        dependencies: Vec<String>,
        timestamp: u64,
    ) -> Self {
        let peer_id = peer_id.into();
        let hash = compute_vertex_hash(
            drp_type_label(operation.drp_type),
            &operation.op_type,
            &operation.value,
            &dependencies,
            &peer_id,
            timestamp,
        );
        Self {
            hash,
            peer_id,
            operation: Some(operation),
            dependencies,
            timestamp,
            signature: Vec::new(),
        }
    }

    /// The synthetic root vertex every hash graph starts from. It has
    /// no author, no operation, and no dependencies; every first real
    /// vertex a peer creates depends on it.
    pub fn root() -> Self {
        Self {
            hash: ROOT_HASH.to_string(),
            peer_id: String::new(),
            operation: None,
            dependencies: Vec::new(),
            timestamp: 0,
            signature: Vec::new(),
        }
    }

    /// True if this is the synthetic root vertex.
    pub fn is_root(&self) -> bool {
        self.hash == ROOT_HASH
    }

    /// Recomputes this vertex's hash from its current fields. The root
    /// is hashed to its own sentinel by definition.
    pub fn compute_hash(&self) -> String {
        if self.is_root() {
            return ROOT_HASH.to_string();
        }
        let (drp_type, op_type, value) = self
            .operation
            .as_ref()
            .map(|op| (drp_type_label(op.drp_type), op.op_type.as_str(), op.value.as_slice()))
            .unwrap_or(("drp", "", &[]));
        compute_vertex_hash(drp_type, op_type, value, &self.dependencies, &self.peer_id, self.timestamp)
    }

    /// Checks invariant H1: `hash` matches a fresh recomputation from
    /// the rest of the fields.
    pub fn has_consistent_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }
}
