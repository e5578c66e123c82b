// Path: crates/drp-queue/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Bounded channels and fan-out message queues.
//!
//! `drp-network` and `drp-node` move everything — inbound wire
//! messages, per-object update streams, discovery traffic — through
//! these primitives rather than raw `tokio::sync::mpsc`, so a single
//! dispatcher task owns the fan-out-to-subscribers behavior instead of
//! every call site reimplementing it.

mod channel;
mod error;
mod manager;
mod queue;

pub use channel::Channel;
pub use error::QueueError;
pub use manager::MessageQueueManager;
pub use queue::{Handler, MessageQueue};
