//! Observability infrastructure for the price estimator
//!
//! Provides:
//! - Prometheus metrics (prediction latency, error counts, artifact loads, readiness)
//! - Structured JSON logging with tracing

use crate::artifact::ArtifactSnapshot;
use crate::models::ReadinessState;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    register_int_gauge_vec, Histogram, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{error, info};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EstimatorMetricsInner> = OnceLock::new();

struct EstimatorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounterVec,
    unknown_locations_total: IntCounter,
    artifact_load_attempts_total: IntCounter,
    artifact_load_failures_total: IntCounterVec,
    readiness_state: IntGauge,
    snapshot_info: IntGaugeVec,
}

impl EstimatorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "price_estimator_prediction_latency_seconds",
                "Time spent encoding and running a single price prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "price_estimator_predictions_total",
                "Total number of successful price predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "price_estimator_prediction_errors_total",
                "Total number of failed predictions by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            unknown_locations_total: register_int_counter!(
                "price_estimator_unknown_locations_total",
                "Predictions made for a location absent from the schema"
            )
            .expect("Failed to register unknown_locations_total"),

            artifact_load_attempts_total: register_int_counter!(
                "price_estimator_artifact_load_attempts_total",
                "Total number of artifact load attempts"
            )
            .expect("Failed to register artifact_load_attempts_total"),

            artifact_load_failures_total: register_int_counter_vec!(
                "price_estimator_artifact_load_failures_total",
                "Total number of failed artifact load attempts by reason",
                &["reason"]
            )
            .expect("Failed to register artifact_load_failures_total"),

            readiness_state: register_int_gauge!(
                "price_estimator_readiness_state",
                "Lifecycle state: 0 uninitialized, 1 loading, 2 ready, 3 degraded"
            )
            .expect("Failed to register readiness_state"),

            snapshot_info: register_int_gauge_vec!(
                "price_estimator_snapshot_info",
                "Information about the currently published artifact snapshot",
                &["fingerprint", "model_kind"]
            )
            .expect("Failed to register snapshot_info"),
        }
    }
}

/// Handle to the process-wide estimator metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct EstimatorMetrics {
    _private: (),
}

impl Default for EstimatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimatorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EstimatorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EstimatorMetricsInner {
        GLOBAL_METRICS.get_or_init(EstimatorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn inc_unknown_locations(&self) {
        self.inner().unknown_locations_total.inc();
    }

    pub fn inc_load_attempts(&self) {
        self.inner().artifact_load_attempts_total.inc();
    }

    pub fn inc_load_failures(&self, reason: &str) {
        self.inner()
            .artifact_load_failures_total
            .with_label_values(&[reason])
            .inc();
    }

    pub fn set_readiness(&self, state: ReadinessState) {
        self.inner().readiness_state.set(state.as_gauge());
    }

    /// Replace the published snapshot label set
    pub fn set_snapshot(&self, snapshot: Option<&ArtifactSnapshot>) {
        self.inner().snapshot_info.reset();
        if let Some(snapshot) = snapshot {
            self.inner()
                .snapshot_info
                .with_label_values(&[snapshot.fingerprint(), snapshot.model().kind()])
                .set(1);
        }
    }

    pub fn predictions_total(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn unknown_locations(&self) -> u64 {
        self.inner().unknown_locations_total.get()
    }

    pub fn prediction_errors(&self, kind: &str) -> u64 {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .get()
    }
}

/// Structured logger for service events
///
/// Emits consistent, machine-parseable events with an `event` field.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, bind_addr: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            bind_addr = %bind_addr,
            "Price estimator starting"
        );
    }

    pub fn log_snapshot_published(&self, snapshot: &ArtifactSnapshot) {
        info!(
            event = "snapshot_published",
            service = %self.service,
            fingerprint = %snapshot.fingerprint(),
            features = snapshot.schema().len(),
            locations = snapshot.schema().locations().len(),
            model_kind = snapshot.model().kind(),
            source_dir = %snapshot.source_dir().display(),
            "Artifacts loaded and verified"
        );
    }

    pub fn log_degraded(&self, reason: &str) {
        error!(
            event = "service_degraded",
            service = %self.service,
            reason = %reason,
            "Artifacts unavailable, serving in degraded mode"
        );
    }

    pub fn log_prediction(&self, location: &str, total_sqft: f64, bhk: u32, bath: u32, price: f64) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            location = %location,
            total_sqft = total_sqft,
            bhk = bhk,
            bath = bath,
            estimated_price = price,
            "Generated price estimate"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_stopped",
            service = %self.service,
            reason = %reason,
            "Price estimator shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_state() {
        let a = EstimatorMetrics::new();
        let b = EstimatorMetrics::new();

        let before = b.prediction_errors("observability_test");
        a.inc_prediction_errors("observability_test");
        assert_eq!(b.prediction_errors("observability_test"), before + 1);
    }

    #[test]
    fn test_metrics_are_gathered() {
        let metrics = EstimatorMetrics::new();
        metrics.set_readiness(ReadinessState::Ready);
        metrics.inc_load_attempts();

        let names: Vec<String> = prometheus::gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"price_estimator_readiness_state".to_string()));
        assert!(names.contains(&"price_estimator_artifact_load_attempts_total".to_string()));
    }
}
