// Path: crates/drp-crypto/src/lib.rs
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! Vertex signing and finality-attestation cryptography.
//!
//! Two distinct curves are in play, for two distinct jobs:
//! secp256k1-with-recovery signs individual vertices (a receiving peer
//! recovers the author's identity from the signature alone), and BLS12-381
//! signs finality attestations (so a quorum of signers collapses to one
//! constant-size aggregate instead of a list of individual signatures).

mod bls;
mod error;
mod keychain;
mod secp;
mod traits;

pub use bls::{aggregate_signatures, verify_aggregate, BlsKeyPair, BlsPrivateKey, BlsPublicKey, BlsSignature};
pub use error::CryptoError;
pub use keychain::{recover_signer, verify_bls_attestation, Keychain, SoftKeychain};
pub use secp::{
    public_key_to_peer_id, recover_peer_id, recover_public_key, Secp256k1KeyPair,
    Secp256k1PrivateKey, Secp256k1PublicKey, Secp256k1Signature,
};
pub use traits::{SerializableKey, Signature, SigningKey, SigningKeyPair, VerifyingKey};
