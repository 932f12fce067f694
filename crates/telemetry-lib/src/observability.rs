//! Observability infrastructure for the telemetry engine
//!
//! Prometheus metrics for the update pipeline: tick latency, tick and
//! error counts, fleet and alert gauges. Logging goes through `tracing`
//! at the call sites.

use prometheus::{register_histogram, register_int_gauge, Histogram, IntGauge};
use std::sync::OnceLock;

/// Histogram buckets for tick latency (seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    tick_latency_seconds: Histogram,
    ticks_completed: IntGauge,
    tick_errors: IntGauge,
    nodes_monitored: IntGauge,
    alerts_active: IntGauge,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            tick_latency_seconds: register_histogram!(
                "fleet_telemetry_tick_latency_seconds",
                "Time spent running one full update tick",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register tick_latency_seconds"),

            ticks_completed: register_int_gauge!(
                "fleet_telemetry_ticks_completed_total",
                "Total number of completed update ticks"
            )
            .expect("Failed to register ticks_completed"),

            tick_errors: register_int_gauge!(
                "fleet_telemetry_tick_errors_total",
                "Total number of update ticks that failed"
            )
            .expect("Failed to register tick_errors"),

            nodes_monitored: register_int_gauge!(
                "fleet_telemetry_nodes_monitored",
                "Number of simulated nodes in the fleet"
            )
            .expect("Failed to register nodes_monitored"),

            alerts_active: register_int_gauge!(
                "fleet_telemetry_alerts_active",
                "Number of alerts currently held in the ledger"
            )
            .expect("Failed to register alerts_active"),
        }
    }
}

/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_tick_latency(&self, duration_secs: f64) {
        self.inner().tick_latency_seconds.observe(duration_secs);
    }

    pub fn inc_ticks_completed(&self) {
        self.inner().ticks_completed.inc();
    }

    pub fn inc_tick_errors(&self) {
        self.inner().tick_errors.inc();
    }

    pub fn set_nodes_monitored(&self, count: i64) {
        self.inner().nodes_monitored.set(count);
    }

    pub fn set_alerts_active(&self, count: i64) {
        self.inner().alerts_active.set(count);
    }
}
