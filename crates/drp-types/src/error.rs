// Path: crates/drp-types/src/error.rs
//! The `ErrorCode` trait gives every error enum in the DRP kernel a
//! stable, machine-readable identifier independent of its `Display`
//! message, so callers (and the wire `Message` envelope's error field)
//! can match on error *kind* without parsing prose.

use thiserror::Error;

/// A stable string identifier for an error variant, used for
/// programmatic matching and for surfacing error kinds across process
/// boundaries (logs, wire messages) without leaking `Display` text.
pub trait ErrorCode {
    /// Returns this error's stable code, e.g. `"INVALID_HASH"`.
    fn code(&self) -> &'static str;
}

/// Errors raised constructing or validating the core identifier and
/// vertex types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    /// A peer id did not decode to a well-formed public key hash.
    #[error("invalid peer id: {0}")]
    InvalidPeerId(String),
    /// A hash string was not 64 lowercase hex characters (and not the
    /// root sentinel).
    #[error("invalid hash: {0}")]
    InvalidHash(String),
    /// A vertex's recorded timestamp fell outside the accepted skew
    /// window relative to the validator's local clock.
    #[error("timestamp {timestamp} is outside the accepted skew window")]
    InvalidTimestamp {
        /// The rejected timestamp, in milliseconds since the Unix epoch.
        timestamp: u64,
    },
}

impl ErrorCode for TypesError {
    fn code(&self) -> &'static str {
        match self {
            TypesError::InvalidPeerId(_) => "INVALID_PEER_ID",
            TypesError::InvalidHash(_) => "INVALID_HASH",
            TypesError::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
        }
    }
}
