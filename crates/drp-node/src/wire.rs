// Path: crates/drp-node/src/wire.rs
//! Type-specific payloads carried in [`drp_network::Message::data`].
//!
//! The envelope itself (`sender`, `message_type`, `object_id`) is
//! SCALE-encoded by `drp-network`; everything past that point is
//! opaque to the transport, so payloads here are plain `serde_json`,
//! the same way `Vertex` and `Operation` already derive `Serialize` for
//! storage and RPC use. A DRP's own argument values travel inside
//! `Vertex.operation.value` using `drp_codec::Value`'s own binary
//! encoding, which isn't `serde`-compatible by design (it distinguishes
//! `Set` from `List`); state snapshots are carried the same way, as
//! `Value::encode()` bytes nested inside the JSON payload.

use serde::{Deserialize, Serialize};

use drp_codec::Value;
use drp_types::Vertex;

use crate::error::NodeError;

/// `FETCH_STATE`: asks a peer for its current state.
#[derive(Serialize, Deserialize)]
pub struct FetchStatePayload {
    /// The frontier vertex hash the requester last observed, echoed
    /// back in the response so it can be matched to this request.
    pub vertex_hash: String,
}

impl FetchStatePayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        serde_json::from_slice(bytes).map_err(|e| NodeError::MalformedPayload {
            message_type: "FETCH_STATE",
            reason: e.to_string(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// `FETCH_STATE_RESPONSE`: carries the ACL and DRP state a
/// `FETCH_STATE` asked for, plus the current finality signer set so the
/// requester can start tracking attestations for it immediately.
#[derive(Serialize, Deserialize)]
pub struct FetchStateResponsePayload {
    /// Echoes the requesting `FetchStatePayload::vertex_hash`.
    pub vertex_hash: String,
    /// `State::encode()`'d bytes of the responder's current ACL state.
    pub acl_state: Vec<u8>,
    /// `State::encode()`'d bytes of the responder's current DRP state.
    pub drp_state: Vec<u8>,
    /// The object's current finality signer set: `(peer_id,
    /// bls_public_key_bytes)` pairs.
    pub finality_signers: Vec<(String, Vec<u8>)>,
}

impl FetchStateResponsePayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        let parsed: Self = serde_json::from_slice(bytes).map_err(|e| NodeError::MalformedPayload {
            message_type: "FETCH_STATE_RESPONSE",
            reason: e.to_string(),
        })?;
        Ok(parsed)
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn decode_states(&self) -> Result<(Value, Value), NodeError> {
        let acl = Value::decode(&self.acl_state).map_err(|e| NodeError::MalformedPayload {
            message_type: "FETCH_STATE_RESPONSE",
            reason: e.to_string(),
        })?;
        let drp = Value::decode(&self.drp_state).map_err(|e| NodeError::MalformedPayload {
            message_type: "FETCH_STATE_RESPONSE",
            reason: e.to_string(),
        })?;
        Ok((acl, drp))
    }
}

/// `UPDATE`: announces newly locally-applied vertices.
#[derive(Serialize, Deserialize)]
pub struct UpdatePayload {
    /// The new vertices, in no particular order — `DRPObject::merge`
    /// retries out-of-order dependencies within one batch.
    pub vertices: Vec<Vertex>,
}

impl UpdatePayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        serde_json::from_slice(bytes).map_err(|e| NodeError::MalformedPayload {
            message_type: "UPDATE",
            reason: e.to_string(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// `SYNC`: asks a peer for the vertices it's missing, given the
/// requester's current frontier.
#[derive(Serialize, Deserialize)]
pub struct SyncPayload {
    /// The requester's current frontier.
    pub frontier: Vec<String>,
}

impl SyncPayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        serde_json::from_slice(bytes).map_err(|e| NodeError::MalformedPayload {
            message_type: "SYNC",
            reason: e.to_string(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// `SYNC_ACCEPT`: carries the vertices a `SYNC` asked for.
#[derive(Serialize, Deserialize)]
pub struct SyncAcceptPayload {
    /// The vertices the requester was missing, in dependency order.
    pub vertices: Vec<Vertex>,
}

impl SyncAcceptPayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        serde_json::from_slice(bytes).map_err(|e| NodeError::MalformedPayload {
            message_type: "SYNC_ACCEPT",
            reason: e.to_string(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// `ATTESTATION_UPDATE`: carries newly collected finality attestations.
#[derive(Serialize, Deserialize)]
pub struct AttestationUpdatePayload {
    /// `(peer_id, vertex_hash, bls_signature_bytes)` triples, already
    /// verified by the sender.
    pub attestations: Vec<(String, String, Vec<u8>)>,
}

impl AttestationUpdatePayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        serde_json::from_slice(bytes).map_err(|e| NodeError::MalformedPayload {
            message_type: "ATTESTATION_UPDATE",
            reason: e.to_string(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// `DRP_DISCOVERY_RESPONSE`: carries the objects a peer is subscribed
/// to and the multiaddrs it can be dialed at, so the requester can
/// decide whether it's worth connecting to directly.
#[derive(Serialize, Deserialize)]
pub struct DiscoveryResponsePayload {
    /// The responding peer's id.
    pub peer_id: String,
    /// Object ids the responder is currently subscribed to.
    pub joined_objects: Vec<String>,
    /// Multiaddrs the responder can be dialed at directly.
    pub multiaddrs: Vec<String>,
}

impl DiscoveryResponsePayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        serde_json::from_slice(bytes).map_err(|e| NodeError::MalformedPayload {
            message_type: "DRP_DISCOVERY_RESPONSE",
            reason: e.to_string(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_state_response_round_trips_both_state_bytes() {
        let payload = FetchStateResponsePayload {
            vertex_hash: "abc".into(),
            acl_state: Value::Set(vec![]).encode(),
            drp_state: Value::Int(7).encode(),
            finality_signers: vec![("peer-a".into(), vec![1, 2, 3])],
        };
        let bytes = payload.encode();
        let decoded = FetchStateResponsePayload::decode(&bytes).unwrap();
        let (acl, drp) = decoded.decode_states().unwrap();
        assert_eq!(acl, Value::Set(vec![]));
        assert_eq!(drp, Value::Int(7));
        assert_eq!(decoded.finality_signers, vec![("peer-a".to_string(), vec![1, 2, 3])]);
    }

    #[test]
    fn update_payload_rejects_truncated_json() {
        assert!(UpdatePayload::decode(b"{not json").is_err());
    }
}
