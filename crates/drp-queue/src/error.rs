// Path: crates/drp-queue/src/error.rs
use thiserror::Error;

use drp_types::ErrorCode;

/// Errors raised by [`crate::Channel`] and [`crate::MessageQueueManager`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The channel or queue has been closed; no further sends or
    /// pending receives will succeed.
    #[error("channel is closed")]
    Closed,
    /// A `MessageQueueManager` was asked to create a queue beyond its
    /// configured `max_queues` cap.
    #[error("queue manager has reached its maximum of {0} queues")]
    MaxQueues(usize),
}

impl ErrorCode for QueueError {
    fn code(&self) -> &'static str {
        match self {
            QueueError::Closed => "QUEUE_CLOSED",
            QueueError::MaxQueues(_) => "QUEUE_MAX_QUEUES",
        }
    }
}
