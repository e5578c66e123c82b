// Path: crates/drp-finality/src/error.rs
use thiserror::Error;

use drp_crypto::CryptoError;
use drp_types::ErrorCode;

/// Errors raised by [`crate::FinalityStore`].
#[derive(Debug, Error)]
pub enum FinalityError {
    /// No signer set has been initialized for this vertex hash yet.
    #[error("no finality state initialized for vertex {0}")]
    UnknownVertex(String),
    /// This peer has already contributed a signature for this vertex.
    #[error("peer {peer} already signed vertex {vertex}")]
    AlreadySigned {
        /// The peer that tried to sign again.
        peer: String,
        /// The vertex it tried to sign.
        vertex: String,
    },
    /// This peer isn't in the eligible signer set for this vertex.
    #[error("peer {peer} is not an eligible finality signer for vertex {vertex}")]
    NotEligible {
        /// The ineligible peer.
        peer: String,
        /// The vertex it tried to sign.
        vertex: String,
    },
    /// The attestation's BLS signature failed to verify or deserialize.
    #[error(transparent)]
    Bls(#[from] CryptoError),
}

impl ErrorCode for FinalityError {
    fn code(&self) -> &'static str {
        match self {
            FinalityError::UnknownVertex(_) => "UNKNOWN_VERTEX",
            FinalityError::AlreadySigned { .. } => "ALREADY_SIGNED",
            FinalityError::NotEligible { .. } => "NOT_ELIGIBLE",
            FinalityError::Bls(_) => "BLS_ERROR",
        }
    }
}
