// Path: crates/drp-hashgraph/src/validate.rs
//! Standalone vertex validation (invariants H1-H3), kept separate from
//! [`crate::HashGraph`] so a peer can reject a malformed vertex before
//! it ever touches graph storage.

use drp_crypto::recover_signer;
use drp_types::Vertex;

use crate::error::HashGraphError;

/// Configuration for [`validate_vertex`].
#[derive(Clone, Copy, Debug)]
pub struct ValidationConfig {
    /// Maximum allowed difference, in milliseconds, between a vertex's
    /// recorded timestamp and the validator's local clock (H3), and
    /// between a vertex's timestamp and its dependencies' (H2).
    pub max_skew_ms: u64,
    /// When true, signature recovery is skipped entirely: any
    /// `peer_id` is accepted as-is. Matches a permissionless
    /// deployment where vertex authorship isn't gated by key
    /// possession.
    pub permissionless: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_skew_ms: 60_000,
            permissionless: false,
        }
    }
}

/// Validates a vertex's self-contained invariants: H1 (hash matches
/// recompute), H3 (timestamp not too far in the future), and — unless
/// `permissionless` — that the signature recovers to `peer_id`.
///
/// Invariant H2 (timestamp not ahead of the vertex's own dependencies)
/// and G1 (dependencies exist) need graph context and are checked by
/// [`crate::HashGraph::add_vertex`] instead.
pub fn validate_vertex(
    vertex: &Vertex,
    now_ms: u64,
    config: &ValidationConfig,
) -> Result<(), HashGraphError> {
    if vertex.is_root() {
        return Ok(());
    }

    if !vertex.has_consistent_hash() {
        return Err(HashGraphError::InvalidHash(vertex.hash.clone()));
    }

    if vertex.timestamp > now_ms.saturating_add(config.max_skew_ms) {
        return Err(HashGraphError::TimestampTooFarAhead {
            vertex: vertex.hash.clone(),
            timestamp: vertex.timestamp,
        });
    }

    if !config.permissionless {
        let recovered = recover_signer(&vertex.hash, &vertex.signature)
            .map_err(|_| HashGraphError::InvalidSignature(vertex.hash.clone()))?;
        if recovered.as_str() != vertex.peer_id {
            return Err(HashGraphError::InvalidSignature(vertex.hash.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drp_codec::Value;
    use drp_crypto::{Keychain, SoftKeychain};
    use drp_types::{DrpType, Operation};

    fn signed_vertex(keychain: &SoftKeychain, timestamp: u64) -> Vertex {
        let op = Operation::new(DrpType::Drp, "add", vec![Value::Int(1)]);
        let mut vertex = Vertex::new(keychain.peer_id().as_str(), op, vec![], timestamp);
        vertex.signature = keychain.sign_vertex(&vertex.hash).unwrap();
        vertex
    }

    #[test]
    fn well_formed_signed_vertex_passes() {
        let keychain = SoftKeychain::generate().unwrap();
        let vertex = signed_vertex(&keychain, 1_000);
        let config = ValidationConfig {
            max_skew_ms: 60_000,
            permissionless: false,
        };
        assert!(validate_vertex(&vertex, 1_000, &config).is_ok());
    }

    #[test]
    fn tampered_hash_is_rejected() {
        let keychain = SoftKeychain::generate().unwrap();
        let mut vertex = signed_vertex(&keychain, 1_000);
        vertex.timestamp += 1; // invalidates the hash without re-signing
        let config = ValidationConfig::default();
        assert!(matches!(
            validate_vertex(&vertex, 1_000, &config),
            Err(HashGraphError::InvalidHash(_))
        ));
    }

    #[test]
    fn far_future_timestamp_is_rejected() {
        let keychain = SoftKeychain::generate().unwrap();
        let vertex = signed_vertex(&keychain, 1_000_000);
        let config = ValidationConfig {
            max_skew_ms: 1_000,
            permissionless: false,
        };
        assert!(matches!(
            validate_vertex(&vertex, 0, &config),
            Err(HashGraphError::TimestampTooFarAhead { .. })
        ));
    }

    #[test]
    fn signature_from_a_different_peer_is_rejected() {
        let keychain = SoftKeychain::generate().unwrap();
        let impostor = SoftKeychain::generate().unwrap();
        let op = Operation::new(DrpType::Drp, "add", vec![Value::Int(1)]);
        let mut vertex = Vertex::new(keychain.peer_id().as_str(), op, vec![], 1_000);
        vertex.signature = impostor.sign_vertex(&vertex.hash).unwrap();
        let config = ValidationConfig::default();
        assert!(matches!(
            validate_vertex(&vertex, 1_000, &config),
            Err(HashGraphError::InvalidSignature(_))
        ));
    }

    #[test]
    fn permissionless_mode_skips_signature_recovery() {
        let op = Operation::new(DrpType::Drp, "add", vec![Value::Int(1)]);
        let vertex = Vertex::new("unverified-peer", op, vec![], 1_000);
        let config = ValidationConfig {
            max_skew_ms: 60_000,
            permissionless: true,
        };
        assert!(validate_vertex(&vertex, 1_000, &config).is_ok());
    }
}
