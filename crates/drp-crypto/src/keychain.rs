// Path: crates/drp-crypto/src/keychain.rs
//! The key material a `Node` needs and nothing else: an identity
//! (`peer_id`), a way to sign vertices, and a way to sign finality
//! attestations. `drp-node` programs against the [`Keychain`] trait so
//! that a future hardware-backed or remote-signer implementation can
//! stand in for [`SoftKeychain`] without touching call sites.

use drp_types::PeerId;

use crate::bls::{BlsKeyPair, BlsPublicKey, BlsSignature};
use crate::error::CryptoError;
use crate::secp::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
use crate::traits::{SerializableKey, SigningKeyPair, VerifyingKey};

/// The key-material surface a `Node` needs to participate in the
/// replication protocol.
pub trait Keychain: Send + Sync {
    /// This node's stable network identity.
    fn peer_id(&self) -> PeerId;

    /// Signs a vertex hash, producing the bytes stored in
    /// `Vertex.signature`.
    fn sign_vertex(&self, vertex_hash: &str) -> Result<Vec<u8>, CryptoError>;

    /// This node's BLS public key, advertised so other peers can verify
    /// its finality attestations.
    fn bls_public_key_bytes(&self) -> Vec<u8>;

    /// Signs a finality attestation payload (typically a vertex hash).
    fn bls_sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// An in-memory [`Keychain`] backed by freshly generated or
/// caller-supplied secp256k1 and BLS key pairs. The default for a
/// locally-run node; a production deployment that needs key custody
/// separated from the node process would implement [`Keychain`]
/// against a remote signer instead.
pub struct SoftKeychain {
    secp: Secp256k1KeyPair,
    bls: BlsKeyPair,
}

impl SoftKeychain {
    /// Generates a fresh keychain.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self {
            secp: Secp256k1KeyPair::generate(),
            bls: BlsKeyPair::generate()?,
        })
    }

    /// Builds a keychain from existing key material, e.g. loaded from a
    /// config file or secret store.
    pub fn from_keys(secp: Secp256k1KeyPair, bls: BlsKeyPair) -> Self {
        Self { secp, bls }
    }

    /// Verifies a vertex signature against this keychain's secp256k1
    /// public key, for local round-trip testing.
    pub fn verify_vertex(
        &self,
        vertex_hash: &str,
        signature: &Secp256k1Signature,
    ) -> Result<(), CryptoError> {
        self.secp
            .public_key()
            .verify(vertex_hash.as_bytes(), signature)
    }

    /// This node's BLS public key in its typed form.
    pub fn bls_public_key(&self) -> BlsPublicKey {
        self.bls.public_key()
    }
}

impl Keychain for SoftKeychain {
    fn peer_id(&self) -> PeerId {
        self.secp.peer_id()
    }

    fn sign_vertex(&self, vertex_hash: &str) -> Result<Vec<u8>, CryptoError> {
        Ok(self.secp.sign(vertex_hash.as_bytes())?.to_bytes())
    }

    fn bls_public_key_bytes(&self) -> Vec<u8> {
        self.bls.public_key().to_bytes()
    }

    fn bls_sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.bls.sign(message)?.to_bytes())
    }
}

/// Decodes a `Vertex.signature` byte string into a typed
/// [`Secp256k1Signature`] and recovers the peer id that produced it.
pub fn recover_signer(
    vertex_hash: &str,
    signature_bytes: &[u8],
) -> Result<PeerId, CryptoError> {
    let signature = Secp256k1Signature::from_bytes(signature_bytes)?;
    crate::secp::recover_peer_id(vertex_hash.as_bytes(), &signature)
}

/// Verifies a raw BLS attestation signature against a raw public key,
/// for the wire-facing code that only has byte strings to work with.
pub fn verify_bls_attestation(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), CryptoError> {
    let public_key = BlsPublicKey::from_bytes(public_key_bytes)?;
    let signature = BlsSignature::from_bytes(signature_bytes)?;
    public_key.verify(message, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_keychain_signs_and_verifies_a_vertex() {
        let keychain = SoftKeychain::generate().unwrap();
        let hash = "deadbeef".repeat(8);
        let sig_bytes = keychain.sign_vertex(&hash).unwrap();
        let recovered = recover_signer(&hash, &sig_bytes).unwrap();
        assert_eq!(recovered, keychain.peer_id());
    }

    #[test]
    fn soft_keychain_signs_and_verifies_a_bls_attestation() {
        let keychain = SoftKeychain::generate().unwrap();
        let message = b"attest:deadbeef";
        let sig_bytes = keychain.bls_sign(message).unwrap();
        let pk_bytes = keychain.bls_public_key_bytes();
        assert!(verify_bls_attestation(&pk_bytes, message, &sig_bytes).is_ok());
    }
}
