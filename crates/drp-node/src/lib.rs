// Path: crates/drp-node/src/lib.rs
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)
)]

//! The node orchestrator: wires a keychain and a network adapter
//! together, runs one actor task per joined object so every vertex
//! merge and local write for that object serializes through a single
//! point, and drives the discovery and reconnect interval runners.

mod config;
mod context;
mod error;
mod handlers;
mod node;
mod object_handle;
mod runners;
mod wire;

pub use config::{DiscoveryConfig, DrpNodeConfig, KeychainConfig, LoggingConfig, NetworkConfig, ReconnectConfig};
pub use context::DispatchCx;
pub use error::NodeError;
pub use node::Node;
pub use object_handle::{ObjectHandle, ObjectQueueItem, ObjectState};
pub use runners::{discovery_runner, reconnect_runner, IntervalRunnerHandle};
