// Path: crates/drp-crypto/src/bls.rs
//! BLS12-381 signatures for finality attestations.
//!
//! A `FinalityStore` quorum check needs to combine attestations from a
//! dynamic, potentially large signer set into one constant-size
//! signature rather than storing and verifying them individually; BLS
//! aggregation is exactly that primitive. Public keys live in G1,
//! signatures in G2, matching the scheme most BLS tooling (including
//! Ethereum's beacon chain) standardizes on.

use blst::min_pk::{AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use rand::RngCore;

use crate::error::CryptoError;
use crate::traits::{Signature as SignatureTrait, SerializableKey, SigningKey, SigningKeyPair, VerifyingKey};

const BLS_DST: &[u8] = b"DRP_BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

fn map_err(e: BLST_ERROR, context: &str) -> CryptoError {
    CryptoError::OperationFailed(format!("{context}: {e:?}"))
}

/// A BLS key pair used to produce finality attestations.
#[derive(Clone)]
pub struct BlsKeyPair {
    secret: SecretKey,
    public: PublicKey,
}

/// A BLS public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsPublicKey(pub PublicKey);

/// A BLS private key.
#[derive(Clone)]
pub struct BlsPrivateKey(pub SecretKey);

/// A BLS signature, or an aggregate of several.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsSignature(pub Signature);

impl BlsKeyPair {
    /// Generates a new key pair from fresh entropy.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut ikm = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut ikm);
        let secret =
            SecretKey::key_gen(&ikm, &[]).map_err(|e| map_err(e, "bls key generation"))?;
        let public = secret.sk_to_pk();
        Ok(Self { secret, public })
    }
}

impl SigningKeyPair for BlsKeyPair {
    type PublicKey = BlsPublicKey;
    type PrivateKey = BlsPrivateKey;
    type Signature = BlsSignature;

    fn public_key(&self) -> Self::PublicKey {
        BlsPublicKey(self.public)
    }

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        BlsPrivateKey(self.secret.clone()).sign(message)
    }
}

impl SigningKey for BlsPrivateKey {
    type Signature = BlsSignature;

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        Ok(BlsSignature(self.0.sign(message, BLS_DST, &[])))
    }
}

impl VerifyingKey for BlsPublicKey {
    type Signature = BlsSignature;

    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError> {
        let result = signature.0.verify(true, message, BLS_DST, &[], &self.0, true);
        if result == BLST_ERROR::BLST_SUCCESS {
            Ok(())
        } else {
            Err(CryptoError::VerificationFailed)
        }
    }
}

/// Combines several signatures over the *same* message into one
/// constant-size aggregate.
pub fn aggregate_signatures(signatures: &[BlsSignature]) -> Result<BlsSignature, CryptoError> {
    if signatures.is_empty() {
        return Err(CryptoError::AggregationFailed(
            "cannot aggregate an empty signature set".into(),
        ));
    }
    let refs: Vec<&Signature> = signatures.iter().map(|s| &s.0).collect();
    let agg = AggregateSignature::aggregate(&refs, true)
        .map_err(|e| CryptoError::AggregationFailed(format!("{e:?}")))?;
    Ok(BlsSignature(agg.to_signature()))
}

/// Verifies an aggregate signature against the set of public keys that
/// are claimed to have all signed the *same* message.
pub fn verify_aggregate(
    public_keys: &[&BlsPublicKey],
    message: &[u8],
    aggregate: &BlsSignature,
) -> Result<(), CryptoError> {
    if public_keys.is_empty() {
        return Err(CryptoError::AggregationFailed(
            "cannot verify an aggregate against zero signers".into(),
        ));
    }
    let refs: Vec<&PublicKey> = public_keys.iter().map(|k| &k.0).collect();
    let result = aggregate.0.fast_aggregate_verify(true, message, BLS_DST, &refs);
    if result == BLST_ERROR::BLST_SUCCESS {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}

impl SerializableKey for BlsPublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.compress().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        PublicKey::from_bytes(bytes)
            .map(BlsPublicKey)
            .map_err(|e| CryptoError::Deserialization(format!("{e:?}")))
    }
}

impl SerializableKey for BlsPrivateKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        SecretKey::from_bytes(bytes)
            .map(BlsPrivateKey)
            .map_err(|e| CryptoError::Deserialization(format!("{e:?}")))
    }
}

impl SerializableKey for BlsSignature {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.compress().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        Signature::from_bytes(bytes)
            .map(BlsSignature)
            .map_err(|e| CryptoError::Deserialization(format!("{e:?}")))
    }
}

impl SignatureTrait for BlsSignature {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let keypair = BlsKeyPair::generate().unwrap();
        let message = b"attest:vertexhash";
        let signature = keypair.sign(message).unwrap();
        assert!(keypair.public_key().verify(message, &signature).is_ok());
    }

    #[test]
    fn verification_fails_for_wrong_message() {
        let keypair = BlsKeyPair::generate().unwrap();
        let signature = keypair.sign(b"real").unwrap();
        assert!(keypair.public_key().verify(b"fake", &signature).is_err());
    }

    #[test]
    fn three_signer_aggregate_verifies() {
        let signers: Vec<BlsKeyPair> = (0..3).map(|_| BlsKeyPair::generate().unwrap()).collect();
        let message = b"attest:vertexhash";
        let signatures: Vec<BlsSignature> =
            signers.iter().map(|k| k.sign(message).unwrap()).collect();
        let aggregate = aggregate_signatures(&signatures).unwrap();

        let public_keys: Vec<BlsPublicKey> = signers.iter().map(|k| k.public_key()).collect();
        let refs: Vec<&BlsPublicKey> = public_keys.iter().collect();
        assert!(verify_aggregate(&refs, message, &aggregate).is_ok());
    }

    #[test]
    fn aggregate_rejects_a_missing_signer() {
        let signers: Vec<BlsKeyPair> = (0..3).map(|_| BlsKeyPair::generate().unwrap()).collect();
        let outsider = BlsKeyPair::generate().unwrap();
        let message = b"attest:vertexhash";
        let signatures: Vec<BlsSignature> =
            signers.iter().map(|k| k.sign(message).unwrap()).collect();
        let aggregate = aggregate_signatures(&signatures).unwrap();

        let mut public_keys: Vec<BlsPublicKey> = signers.iter().map(|k| k.public_key()).collect();
        public_keys[0] = outsider.public_key();
        let refs: Vec<&BlsPublicKey> = public_keys.iter().collect();
        assert!(verify_aggregate(&refs, message, &aggregate).is_err());
    }

    #[test]
    fn aggregating_zero_signatures_is_an_error() {
        assert!(aggregate_signatures(&[]).is_err());
    }
}
