// Path: crates/drp-node/src/error.rs
use thiserror::Error;

use drp_finality::FinalityError;
use drp_hashgraph::HashGraphError;
use drp_network::NetworkError;
use drp_object::PipelineError;
use drp_queue::QueueError;
use drp_types::{ErrorCode, TypesError};

/// Errors raised wiring a [`crate::Node`] together and dispatching
/// messages through it.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A message named an `object_id` that didn't decode as one.
    #[error(transparent)]
    Types(#[from] TypesError),
    /// The object's hash graph or replay pipeline rejected something.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// A lower-level hash graph operation failed outside the replay
    /// pipeline, e.g. while answering a `SYNC` diff.
    #[error(transparent)]
    Graph(#[from] HashGraphError),
    /// Finality attestation bookkeeping failed.
    #[error(transparent)]
    Finality(#[from] FinalityError),
    /// The network adapter failed to publish or subscribe.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// An object's command inbox rejected a send because it's closed.
    #[error("object {0} is no longer accepting commands")]
    ObjectInboxClosed(String),
    /// A message's `object_id` didn't name a joined object.
    #[error("no joined object with id {0}")]
    UnknownObject(String),
    /// A message's `data` payload didn't deserialize as the shape its
    /// `message_type` implies.
    #[error("malformed payload for {message_type}: {reason}")]
    MalformedPayload {
        /// The message type whose payload failed to parse.
        message_type: &'static str,
        /// What went wrong decoding it.
        reason: String,
    },
}

impl From<QueueError> for NodeError {
    fn from(error: QueueError) -> Self {
        NodeError::ObjectInboxClosed(error.to_string())
    }
}

impl ErrorCode for NodeError {
    fn code(&self) -> &'static str {
        match self {
            NodeError::Types(e) => e.code(),
            NodeError::Pipeline(e) => e.code(),
            NodeError::Graph(e) => e.code(),
            NodeError::Finality(e) => e.code(),
            NodeError::Network(e) => e.code(),
            NodeError::ObjectInboxClosed(_) => "OBJECT_INBOX_CLOSED",
            NodeError::UnknownObject(_) => "UNKNOWN_OBJECT",
            NodeError::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
        }
    }
}
