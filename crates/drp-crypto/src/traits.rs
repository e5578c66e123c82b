// Path: crates/drp-crypto/src/traits.rs
//! Unified traits over the two signature algorithms this crate wraps.
//!
//! `drp-hashgraph` and `drp-finality` program against these traits, not
//! against `secp256k1`/`blst` directly, so neither crate needs to know
//! which curve a vertex signature or an attestation signature actually
//! lives on.

use crate::error::CryptoError;

/// A key or signature that can be serialized to and from bytes.
pub trait SerializableKey {
    /// Converts to a byte vector.
    fn to_bytes(&self) -> Vec<u8>;

    /// Parses from a byte slice.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError>
    where
        Self: Sized;
}

/// A key pair used in a signature algorithm.
pub trait SigningKeyPair {
    /// The public half, used for verification.
    type PublicKey: VerifyingKey<Signature = Self::Signature>;
    /// The private half, used for signing.
    type PrivateKey: SigningKey<Signature = Self::Signature>;
    /// The signature type this pair produces.
    type Signature: Signature;

    /// Returns the public key.
    fn public_key(&self) -> Self::PublicKey;
    /// Signs a message with the private key.
    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError>;
}

/// A public key used to verify signatures.
pub trait VerifyingKey: SerializableKey {
    /// The signature type this key verifies.
    type Signature: Signature;
    /// Checks `signature` over `message`.
    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError>;
}

/// A private key used to produce signatures.
pub trait SigningKey: SerializableKey {
    /// The signature type this key produces.
    type Signature: Signature;
    /// Signs `message`.
    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError>;
}

/// A marker trait for a cryptographic signature.
pub trait Signature: SerializableKey {}
