// Path: crates/drp-finality/src/store.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use drp_crypto::{BlsPublicKey, BlsSignature, SerializableKey, VerifyingKey};
use drp_types::PeerId;

use crate::error::FinalityError;

/// How large a quorum of finality signatures must be before a vertex
/// is considered finalized.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FinalityConfig {
    /// The minimum fraction of the eligible signer set that must sign,
    /// e.g. `0.67` for a two-thirds supermajority.
    pub signer_ratio: f64,
    /// A floor on the absolute number of signatures required,
    /// regardless of how small the eligible signer set is.
    pub min_signers: u32,
}

impl Default for FinalityConfig {
    fn default() -> Self {
        Self {
            signer_ratio: 0.67,
            min_signers: 1,
        }
    }
}

impl FinalityConfig {
    fn quorum(&self, total_signers: usize) -> usize {
        let ratio_quorum = (self.signer_ratio * total_signers as f64).ceil() as usize;
        ratio_quorum.max(self.min_signers as usize)
    }
}

struct VertexAttestations {
    /// The signer set and their advertised BLS keys at the time
    /// finality tracking for this vertex began.
    signers: BTreeMap<PeerId, Vec<u8>>,
    signatures: BTreeMap<PeerId, BlsSignature>,
}

impl VertexAttestations {
    fn aggregate(&self) -> Option<BlsSignature> {
        if self.signatures.is_empty() {
            return None;
        }
        let sigs: Vec<BlsSignature> = self.signatures.values().cloned().collect();
        drp_crypto::aggregate_signatures(&sigs).ok()
    }
}

/// Tracks, per vertex hash, which eligible peers have contributed a
/// BLS finality attestation, and whether enough of them have to
/// consider the vertex finalized.
///
/// A `FinalityStore` knows nothing about the hash graph itself — it is
/// driven entirely by `initialize_state` (called once a vertex's
/// eligible signer set is known, typically its ACL's current Finality
/// group) and `add_signatures` (called as attestations arrive over the
/// network).
#[derive(Default)]
pub struct FinalityStore {
    config: FinalityConfig,
    vertices: BTreeMap<String, VertexAttestations>,
}

impl FinalityStore {
    /// Creates an empty store with the given quorum configuration.
    pub fn new(config: FinalityConfig) -> Self {
        Self {
            config,
            vertices: BTreeMap::new(),
        }
    }

    /// Records the eligible signer set (peer id -> BLS public key
    /// bytes) for `vertex_hash`. Re-initializing an already-tracked
    /// vertex replaces its signer set but keeps any signatures already
    /// collected from peers still present in the new set.
    pub fn initialize_state(&mut self, vertex_hash: impl Into<String>, signers: BTreeMap<PeerId, Vec<u8>>) {
        let vertex_hash = vertex_hash.into();
        let entry = self.vertices.entry(vertex_hash).or_insert_with(|| VertexAttestations {
            signers: BTreeMap::new(),
            signatures: BTreeMap::new(),
        });
        entry.signatures.retain(|peer, _| signers.contains_key(peer));
        entry.signers = signers;
    }

    /// True if `peer_id` is eligible to sign `vertex_hash` and hasn't
    /// already done so.
    pub fn can_sign(&self, peer_id: &PeerId, vertex_hash: &str) -> bool {
        self.vertices.get(vertex_hash).is_some_and(|v| {
            v.signers.contains_key(peer_id) && !v.signatures.contains_key(peer_id)
        })
    }

    /// Adds one attestation (`vertex_hash`, `signature`) authored by
    /// `peer_id`, optionally verifying it against the peer's
    /// registered BLS key first. Returns whether it was newly added.
    pub fn add_signature(
        &mut self,
        peer_id: &PeerId,
        vertex_hash: &str,
        signature_bytes: &[u8],
        verify: bool,
    ) -> Result<bool, FinalityError> {
        let entry = self
            .vertices
            .get_mut(vertex_hash)
            .ok_or_else(|| FinalityError::UnknownVertex(vertex_hash.to_string()))?;

        if entry.signatures.contains_key(peer_id) {
            return Err(FinalityError::AlreadySigned {
                peer: peer_id.to_string(),
                vertex: vertex_hash.to_string(),
            });
        }
        let Some(key_bytes) = entry.signers.get(peer_id) else {
            return Err(FinalityError::NotEligible {
                peer: peer_id.to_string(),
                vertex: vertex_hash.to_string(),
            });
        };

        let signature = BlsSignature::from_bytes(signature_bytes)?;
        if verify {
            let public_key = BlsPublicKey::from_bytes(key_bytes)?;
            public_key.verify(vertex_hash.as_bytes(), &signature)?;
        }
        entry.signatures.insert(peer_id.clone(), signature);
        Ok(true)
    }

    /// Adds a batch of attestations authored by `peer_id`, skipping
    /// (rather than failing on) any this peer isn't eligible for or
    /// has already signed. Returns the vertex hashes actually added.
    pub fn add_signatures(
        &mut self,
        peer_id: &PeerId,
        attestations: &[(String, Vec<u8>)],
        verify: bool,
    ) -> Vec<String> {
        let mut added = Vec::new();
        for (vertex_hash, signature_bytes) in attestations {
            match self.add_signature(peer_id, vertex_hash, signature_bytes, verify) {
                Ok(true) => added.push(vertex_hash.clone()),
                _ => continue,
            }
        }
        added
    }

    /// Merges attestations already verified by another peer, e.g.
    /// received as part of a sync response — equivalent to
    /// `add_signatures` with `verify = false` for each signer.
    pub fn merge_signatures(&mut self, items: &[(PeerId, String, Vec<u8>)]) -> Vec<String> {
        let mut merged = Vec::new();
        for (peer_id, vertex_hash, signature_bytes) in items {
            if matches!(self.add_signature(peer_id, vertex_hash, signature_bytes, false), Ok(true)) {
                merged.push(vertex_hash.clone());
            }
        }
        merged
    }

    /// The aggregated attestation for `vertex_hash`, if any signatures
    /// have been collected yet.
    pub fn get_attestation(&self, vertex_hash: &str) -> Option<Vec<u8>> {
        self.vertices
            .get(vertex_hash)
            .and_then(VertexAttestations::aggregate)
            .map(|sig| sig.to_bytes())
    }

    /// How many signatures have been collected for `vertex_hash`.
    pub fn get_number_of_signatures(&self, vertex_hash: &str) -> usize {
        self.vertices.get(vertex_hash).map(|v| v.signatures.len()).unwrap_or(0)
    }

    /// Whether `vertex_hash` has reached quorum: at least
    /// `max(min_signers, ceil(signer_ratio * |signers|))` signatures.
    pub fn is_finalized(&self, vertex_hash: &str) -> bool {
        let Some(entry) = self.vertices.get(vertex_hash) else {
            return false;
        };
        entry.signatures.len() >= self.config.quorum(entry.signers.len())
    }
}
