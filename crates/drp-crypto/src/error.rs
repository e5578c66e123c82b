// Path: crates/drp-crypto/src/error.rs
use thiserror::Error;

use drp_types::ErrorCode;

/// Errors raised by key generation, signing, verification, and
/// aggregation in this crate.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A byte slice handed to a key or signature constructor had the
    /// wrong length for its type.
    #[error("invalid key or signature length: expected {expected}, got {got}")]
    InvalidLength {
        /// The required length in bytes.
        expected: usize,
        /// The length actually supplied.
        got: usize,
    },
    /// A key or signature failed to parse from otherwise
    /// correctly-sized bytes.
    #[error("failed to deserialize: {0}")]
    Deserialization(String),
    /// Signature verification did not hold for the given message.
    #[error("signature verification failed")]
    VerificationFailed,
    /// A compact-with-recovery signature's recovery id did not yield a
    /// consistent public key.
    #[error("public key recovery failed")]
    RecoveryFailed,
    /// A BLS aggregate signature operation failed (empty input, or a
    /// component signature that did not verify).
    #[error("signature aggregation failed: {0}")]
    AggregationFailed(String),
    /// Catch-all for library-reported failures that don't fit the
    /// variants above.
    #[error("cryptographic operation failed: {0}")]
    OperationFailed(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            CryptoError::InvalidLength { .. } => "CRYPTO_INVALID_LENGTH",
            CryptoError::Deserialization(_) => "CRYPTO_DESERIALIZATION",
            CryptoError::VerificationFailed => "INVALID_SIGNATURE",
            CryptoError::RecoveryFailed => "CRYPTO_RECOVERY_FAILED",
            CryptoError::AggregationFailed(_) => "CRYPTO_AGGREGATION_FAILED",
            CryptoError::OperationFailed(_) => "CRYPTO_OPERATION_FAILED",
        }
    }
}
