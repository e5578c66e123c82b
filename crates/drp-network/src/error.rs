// Path: crates/drp-network/src/error.rs
use thiserror::Error;

use drp_types::ErrorCode;

/// Errors raised by the wire codec and the network adapter.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A received envelope didn't decode as a valid [`crate::Message`].
    #[error("failed to decode message envelope: {0}")]
    Decode(String),
    /// An outgoing gossipsub publish failed.
    #[error("publish failed: {0}")]
    Publish(String),
    /// Joining or leaving a gossipsub topic failed.
    #[error("subscription failed: {0}")]
    Subscription(String),
    /// Swarm construction (transport, identity, listen address) failed.
    #[error("transport setup failed: {0}")]
    Transport(String),
}

impl ErrorCode for NetworkError {
    fn code(&self) -> &'static str {
        match self {
            NetworkError::Decode(_) => "NETWORK_DECODE",
            NetworkError::Publish(_) => "NETWORK_PUBLISH",
            NetworkError::Subscription(_) => "NETWORK_SUBSCRIPTION",
            NetworkError::Transport(_) => "NETWORK_TRANSPORT",
        }
    }
}
