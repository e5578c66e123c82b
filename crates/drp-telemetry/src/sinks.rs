// Path: crates/drp-telemetry/src/sinks.rs
//! Abstract traits for metrics reporting, decoupling `drp-network`,
//! `drp-hashgraph`/`drp-object`, and `drp-node` from any particular
//! metrics backend.

use once_cell::sync::OnceCell;

/// A no-op sink for tests or when no backend has been installed.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized reference to the installed [`MetricsSink`].
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns the installed network metrics sink, or a no-op if none was installed.
pub fn network_metrics() -> &'static dyn NetworkMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns the installed hashgraph metrics sink, or a no-op if none was installed.
pub fn graph_metrics() -> &'static dyn GraphMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns the installed error metrics sink, or a no-op if none was installed.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// A sink for metrics related to the gossipsub transport.
pub trait NetworkMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for gossip messages received, labeled by message type.
    fn inc_messages_received(&self, message_type: &str);
    /// Increments a counter for gossip messages broadcast, labeled by message type.
    fn inc_messages_sent(&self, message_type: &str);
    /// Increments a counter for envelopes that failed to decode off the wire.
    fn inc_decode_failures(&self);
    /// Sets the gauge for the number of objects with an active gossip subscription.
    fn set_joined_objects(&self, count: u64);
}
impl NetworkMetricsSink for NopSink {
    fn inc_messages_received(&self, _message_type: &str) {}
    fn inc_messages_sent(&self, _message_type: &str) {}
    fn inc_decode_failures(&self) {}
    fn set_joined_objects(&self, _count: u64) {}
}

/// A sink for metrics related to hashgraph replication and conflict resolution.
pub trait GraphMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter of vertices accepted into an object's hashgraph.
    fn inc_vertices_applied(&self, object_id: &str);
    /// Increments the counter of vertices rejected by validation, labeled by reason.
    fn inc_vertices_rejected(&self, reason: &'static str);
    /// Increments the counter of concurrent pairs resolved by a `Drp`'s conflict resolver.
    fn inc_conflicts_resolved(&self, object_id: &str);
    /// Sets the gauge for the current frontier size of an object's hashgraph.
    fn set_frontier_size(&self, object_id: &str, size: u64);
    /// Observes the wall-clock duration of replaying an object's full history.
    fn observe_replay_duration(&self, object_id: &str, duration_secs: f64);
}
impl GraphMetricsSink for NopSink {
    fn inc_vertices_applied(&self, _object_id: &str) {}
    fn inc_vertices_rejected(&self, _reason: &'static str) {}
    fn inc_conflicts_resolved(&self, _object_id: &str) {}
    fn set_frontier_size(&self, _object_id: &str, _size: u64) {}
    fn observe_replay_duration(&self, _object_id: &str, _duration_secs: f64) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its source crate and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink implementing every domain-specific trait, giving a
/// single point of implementation for a metrics backend.
pub trait MetricsSink: NetworkMetricsSink + GraphMetricsSink + ErrorMetricsSink {}

impl<T> MetricsSink for T where T: NetworkMetricsSink + GraphMetricsSink + ErrorMetricsSink {}
