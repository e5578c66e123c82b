// Path: crates/drp-telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the `prometheus` crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram_vec, register_int_counter,
    register_int_counter_vec, Gauge, HistogramVec, IntCounter, IntCounterVec,
};

static JOINED_OBJECTS: OnceCell<Gauge> = OnceCell::new();
static MESSAGES_RECEIVED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static MESSAGES_SENT_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static DECODE_FAILURES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static VERTICES_APPLIED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static VERTICES_REJECTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static CONFLICTS_RESOLVED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static FRONTIER_SIZE: OnceCell<prometheus::GaugeVec> = OnceCell::new();
static REPLAY_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

macro_rules! get_metric {
    ($metric:ident) => {
        $metric.get().expect("prometheus sink not initialized, call drp_telemetry::prometheus::install() first")
    };
}

impl NetworkMetricsSink for PrometheusSink {
    fn inc_messages_received(&self, message_type: &str) {
        get_metric!(MESSAGES_RECEIVED_TOTAL).with_label_values(&[message_type]).inc();
    }
    fn inc_messages_sent(&self, message_type: &str) {
        get_metric!(MESSAGES_SENT_TOTAL).with_label_values(&[message_type]).inc();
    }
    fn inc_decode_failures(&self) {
        get_metric!(DECODE_FAILURES_TOTAL).inc();
    }
    fn set_joined_objects(&self, count: u64) {
        get_metric!(JOINED_OBJECTS).set(count as f64);
    }
}

impl GraphMetricsSink for PrometheusSink {
    fn inc_vertices_applied(&self, object_id: &str) {
        get_metric!(VERTICES_APPLIED_TOTAL).with_label_values(&[object_id]).inc();
    }
    fn inc_vertices_rejected(&self, reason: &'static str) {
        get_metric!(VERTICES_REJECTED_TOTAL).with_label_values(&[reason]).inc();
    }
    fn inc_conflicts_resolved(&self, object_id: &str) {
        get_metric!(CONFLICTS_RESOLVED_TOTAL).with_label_values(&[object_id]).inc();
    }
    fn set_frontier_size(&self, object_id: &str, size: u64) {
        get_metric!(FRONTIER_SIZE).with_label_values(&[object_id]).set(size as f64);
    }
    fn observe_replay_duration(&self, object_id: &str, duration_secs: f64) {
        get_metric!(REPLAY_DURATION_SECONDS).with_label_values(&[object_id]).observe(duration_secs);
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        get_metric!(ERRORS_TOTAL).with_label_values(&[kind, variant]).inc();
    }
}

/// Registers every collector with the default Prometheus registry and
/// returns a static reference to the sink. Must be called at most once.
#[allow(clippy::expect_used)]
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    JOINED_OBJECTS
        .set(register_gauge!("drp_network_joined_objects", "Number of objects with an active gossip subscription.")?)
        .expect("static already initialized");
    MESSAGES_RECEIVED_TOTAL
        .set(register_int_counter_vec!(
            "drp_network_messages_received_total",
            "Total gossip messages received, labeled by message type.",
            &["message_type"]
        )?)
        .expect("static already initialized");
    MESSAGES_SENT_TOTAL
        .set(register_int_counter_vec!(
            "drp_network_messages_sent_total",
            "Total gossip messages broadcast, labeled by message type.",
            &["message_type"]
        )?)
        .expect("static already initialized");
    DECODE_FAILURES_TOTAL
        .set(register_int_counter!("drp_network_decode_failures_total", "Total envelopes that failed to decode.")?)
        .expect("static already initialized");
    VERTICES_APPLIED_TOTAL
        .set(register_int_counter_vec!(
            "drp_graph_vertices_applied_total",
            "Total vertices accepted into an object's hashgraph.",
            &["object_id"]
        )?)
        .expect("static already initialized");
    VERTICES_REJECTED_TOTAL
        .set(register_int_counter_vec!(
            "drp_graph_vertices_rejected_total",
            "Total vertices rejected by validation, labeled by reason.",
            &["reason"]
        )?)
        .expect("static already initialized");
    CONFLICTS_RESOLVED_TOTAL
        .set(register_int_counter_vec!(
            "drp_graph_conflicts_resolved_total",
            "Total concurrent vertex pairs resolved by a Drp's conflict resolver.",
            &["object_id"]
        )?)
        .expect("static already initialized");
    FRONTIER_SIZE
        .set(prometheus::register_gauge_vec!(
            "drp_graph_frontier_size",
            "Current frontier size of an object's hashgraph.",
            &["object_id"]
        )?)
        .expect("static already initialized");
    REPLAY_DURATION_SECONDS
        .set(register_histogram_vec!(
            "drp_graph_replay_duration_seconds",
            "Latency of replaying an object's full linearized history.",
            &["object_id"],
            exponential_buckets(0.0001, 2.0, 16)?
        )?)
        .expect("static already initialized");
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "drp_errors_total",
            "Total number of errors, categorized by source crate and variant.",
            &["kind", "variant"]
        )?)
        .expect("static already initialized");

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}

/// Calls [`install`] and registers the result as the process-wide sink
/// returned by [`crate::sinks::network_metrics`] and friends.
pub fn install_global() -> Result<(), prometheus::Error> {
    let sink = install()?;
    let _ = crate::sinks::SINK.set(sink);
    Ok(())
}
