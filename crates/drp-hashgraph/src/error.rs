// Path: crates/drp-hashgraph/src/error.rs
use thiserror::Error;

use drp_types::ErrorCode;

/// Errors raised inserting into or querying a [`crate::HashGraph`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashGraphError {
    /// Invariant H1: the vertex's `hash` field doesn't match a fresh
    /// recomputation over its other fields.
    #[error("vertex hash {0} does not match its recomputed content hash")]
    InvalidHash(String),
    /// Invariant G1: a dependency hash doesn't reference any vertex
    /// already in the graph.
    #[error("vertex {vertex} depends on unknown vertex {dependency}")]
    MissingDependency {
        /// The vertex being inserted.
        vertex: String,
        /// The dependency hash it references that isn't present.
        dependency: String,
    },
    /// Invariant H2: two timestamps in the same dependency chain are
    /// further apart than the configured skew tolerance, or a
    /// dependency's timestamp is not strictly before its dependent's.
    #[error("vertex {vertex} has a timestamp inconsistent with its dependencies")]
    InvalidTimestamp {
        /// The offending vertex.
        vertex: String,
    },
    /// Invariant H3: the vertex's timestamp is further in the future
    /// than the accepted clock-skew tolerance.
    #[error("vertex {vertex} timestamp {timestamp} is too far in the future")]
    TimestampTooFarAhead {
        /// The offending vertex.
        vertex: String,
        /// Its recorded timestamp.
        timestamp: u64,
    },
    /// The vertex's signature does not recover to its claimed
    /// `peer_id`.
    #[error("vertex {0} has an invalid signature")]
    InvalidSignature(String),
    /// Inserting this vertex would close a cycle (invariant G2).
    #[error("vertex {0} would introduce a cycle")]
    CycleDetected(String),
    /// The vertex is already present; re-insertion is a no-op success
    /// at the caller, not a graph-level error, except where the caller
    /// explicitly asked to detect duplicates.
    #[error("vertex {0} is already present in the graph")]
    AlreadyPresent(String),
    /// An LCA or linearization query named a vertex not in the graph.
    #[error("unknown vertex {0}")]
    UnknownVertex(String),
}

impl ErrorCode for HashGraphError {
    fn code(&self) -> &'static str {
        match self {
            HashGraphError::InvalidHash(_) => "INVALID_HASH",
            HashGraphError::MissingDependency { .. } => "MISSING_DEPENDENCY",
            HashGraphError::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
            HashGraphError::TimestampTooFarAhead { .. } => "INVALID_TIMESTAMP",
            HashGraphError::InvalidSignature(_) => "INVALID_SIGNATURE",
            HashGraphError::CycleDetected(_) => "CYCLE_DETECTED",
            HashGraphError::AlreadyPresent(_) => "ALREADY_PRESENT",
            HashGraphError::UnknownVertex(_) => "UNKNOWN_VERTEX",
        }
    }
}
