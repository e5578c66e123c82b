// Path: crates/drp-object/src/error.rs
use thiserror::Error;

use drp_hashgraph::HashGraphError;
use drp_types::ErrorCode;

/// Errors a [`crate::Drp`] implementation raises applying or querying
/// its own state.
#[derive(Debug, Error)]
pub enum DrpError {
    /// The named operation or query isn't one this `Drp` understands.
    #[error("unknown operation or query: {0}")]
    UnknownOperation(String),
    /// The operation's argument list didn't have the expected shape.
    #[error("malformed arguments for {operation}: {reason}")]
    MalformedArguments {
        /// The operation whose arguments were malformed.
        operation: String,
        /// What was wrong with them.
        reason: String,
    },
    /// The state blob handed to `load_state` wasn't shaped the way
    /// this `Drp` expects.
    #[error("invalid state snapshot: {0}")]
    InvalidState(String),
}

impl ErrorCode for DrpError {
    fn code(&self) -> &'static str {
        match self {
            DrpError::UnknownOperation(_) => "UNKNOWN_OPERATION",
            DrpError::MalformedArguments { .. } => "MALFORMED_ARGUMENTS",
            DrpError::InvalidState(_) => "INVALID_STATE",
        }
    }
}

/// Errors raised by [`crate::DRPObject`]'s vertex creation and merge
/// pipeline, layering on top of the lower-level [`DrpError`] and
/// [`HashGraphError`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The `Drp` implementation rejected the operation.
    #[error(transparent)]
    Drp(#[from] DrpError),
    /// The hash graph rejected the vertex.
    #[error(transparent)]
    Graph(#[from] HashGraphError),
    /// Signing or signature recovery failed.
    #[error("signing failed: {0}")]
    Signing(String),
    /// A DRP-layer operation was authored by a peer that doesn't
    /// currently hold write access. Local calls surface this to the
    /// caller; a remote vertex failing this check is silently dropped
    /// during merge rather than rejecting the whole batch.
    #[error("peer {peer} is not a writer")]
    NotAWriter {
        /// The peer whose write was rejected.
        peer: String,
    },
}

impl ErrorCode for PipelineError {
    fn code(&self) -> &'static str {
        match self {
            PipelineError::Drp(e) => e.code(),
            PipelineError::Graph(e) => e.code(),
            PipelineError::Signing(_) => "SIGNING_FAILED",
            PipelineError::NotAWriter { .. } => "NOT_A_WRITER",
        }
    }
}
