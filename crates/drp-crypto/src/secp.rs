// Path: crates/drp-crypto/src/secp.rs
//! Vertex signing: compact-with-recovery ECDSA over secp256k1.
//!
//! Recovery matters here because a vertex doesn't carry its author's
//! public key alongside the signature — `peer_id` is the only
//! identifying field, and a receiving peer must recover the signing
//! key from `(vertex_hash, signature)` and compare its derived peer id
//! against `vertex.peer_id` to reject a vertex signed by someone else.

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;
use crate::traits::{Signature as SignatureTrait, SerializableKey, SigningKey, SigningKeyPair, VerifyingKey};
use drp_types::PeerId;

fn digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(message);
    hasher.finalize().into()
}

/// A secp256k1 key pair used to sign vertices.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

/// A secp256k1 public key, identifying a vertex's author.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey(pub PublicKey);

/// A secp256k1 private key.
#[derive(Clone)]
pub struct Secp256k1PrivateKey(pub SecretKey);

/// A compact-with-recovery ECDSA signature: 64 signature bytes plus a
/// one-byte recovery id, so the signer's public key can be recovered
/// from `(message, signature)` alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature(pub RecoverableSignature);

impl Secp256k1KeyPair {
    /// Generates a new random key pair.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let mut rng = rand::rngs::OsRng;
        let (secret, public) = secp.generate_keypair(&mut rng);
        Self { secret, public }
    }

    /// Reconstructs a key pair from a raw 32-byte secret key.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| CryptoError::Deserialization(e.to_string()))?;
        let secp = Secp256k1::new();
        let public = PublicKey::from_secret_key(&secp, &secret);
        Ok(Self { secret, public })
    }

    /// Derives this key pair's network [`PeerId`]: the base58 encoding
    /// of the SHA-256 hash of the compressed public key.
    pub fn peer_id(&self) -> PeerId {
        public_key_to_peer_id(&self.public)
    }
}

/// Derives the [`PeerId`] a given public key resolves to.
#[allow(clippy::unwrap_used)]
pub fn public_key_to_peer_id(public: &PublicKey) -> PeerId {
    let hash = digest(&public.serialize());
    // bs58-encoding a 32-byte sha256 digest is always a non-empty string.
    PeerId::new(bs58::encode(hash).into_string()).unwrap()
}

impl SigningKeyPair for Secp256k1KeyPair {
    type PublicKey = Secp256k1PublicKey;
    type PrivateKey = Secp256k1PrivateKey;
    type Signature = Secp256k1Signature;

    fn public_key(&self) -> Self::PublicKey {
        Secp256k1PublicKey(self.public)
    }

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        Secp256k1PrivateKey(self.secret).sign(message)
    }
}

impl SigningKey for Secp256k1PrivateKey {
    type Signature = Secp256k1Signature;

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        let secp = Secp256k1::new();
        let msg = Message::from_slice(&digest(message))
            .map_err(|e| CryptoError::OperationFailed(e.to_string()))?;
        Ok(Secp256k1Signature(secp.sign_ecdsa_recoverable(&msg, &self.0)))
    }
}

impl VerifyingKey for Secp256k1PublicKey {
    type Signature = Secp256k1Signature;

    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError> {
        let secp = Secp256k1::new();
        let msg = Message::from_slice(&digest(message))
            .map_err(|e| CryptoError::OperationFailed(e.to_string()))?;
        let sig = signature.0.to_standard();
        secp.verify_ecdsa(&msg, &sig, &self.0)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

/// Recovers the public key that produced `signature` over `message`,
/// without being told which key to check against.
pub fn recover_public_key(
    message: &[u8],
    signature: &Secp256k1Signature,
) -> Result<Secp256k1PublicKey, CryptoError> {
    let secp = Secp256k1::new();
    let msg = Message::from_slice(&digest(message))
        .map_err(|e| CryptoError::OperationFailed(e.to_string()))?;
    let public = secp
        .recover_ecdsa(&msg, &signature.0)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(Secp256k1PublicKey(public))
}

/// Recovers the [`PeerId`] that authored `signature` over `message`.
pub fn recover_peer_id(message: &[u8], signature: &Secp256k1Signature) -> Result<PeerId, CryptoError> {
    let public = recover_public_key(message, signature)?;
    Ok(public_key_to_peer_id(&public.0))
}

impl SerializableKey for Secp256k1PublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.serialize().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        PublicKey::from_slice(bytes)
            .map(Secp256k1PublicKey)
            .map_err(|e| CryptoError::Deserialization(e.to_string()))
    }
}

impl SerializableKey for Secp256k1PrivateKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.secret_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        SecretKey::from_slice(bytes)
            .map(Secp256k1PrivateKey)
            .map_err(|e| CryptoError::Deserialization(e.to_string()))
    }
}

impl SerializableKey for Secp256k1Signature {
    fn to_bytes(&self) -> Vec<u8> {
        let (recovery_id, compact) = self.0.serialize_compact();
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&compact);
        out.push(recovery_id.to_i32() as u8);
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidLength {
                expected: 65,
                got: bytes.len(),
            });
        }
        let recovery_id = RecoveryId::from_i32(bytes[64] as i32)
            .map_err(|e| CryptoError::Deserialization(e.to_string()))?;
        let sig = RecoverableSignature::from_compact(&bytes[..64], recovery_id)
            .map_err(|e| CryptoError::Deserialization(e.to_string()))?;
        Ok(Secp256k1Signature(sig))
    }
}

impl SignatureTrait for Secp256k1Signature {}
