// Path: crates/drp-telemetry/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing))]

//! Structured logging initialization and the metrics sink traits shared
//! across the workspace, so `drp-network`, `drp-hashgraph`/`drp-object`,
//! and `drp-node` instrument themselves against an abstract sink rather
//! than a concrete metrics backend.

/// The initialization routine for the global `tracing` subscriber.
pub mod init;
/// The `prometheus`-backed implementation of the metrics sinks.
pub mod prometheus;
/// The `*MetricsSink` traits and the no-op default.
pub mod sinks;

pub use init::init_tracing;
pub use sinks::{error_metrics, graph_metrics, network_metrics, ErrorMetricsSink, GraphMetricsSink, MetricsSink, NetworkMetricsSink, NopSink};
