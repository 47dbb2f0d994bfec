//! Prometheus metrics for predictions and model loading.
//!
//! Recording is a no-op until a recorder is installed; the `serve` command
//! installs a Prometheus recorder and exposes it on `GET /metrics`.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Prediction latency metric name.
pub const METRIC_PREDICTION_LATENCY: &str = "prediction_latency_ms";
/// Model load latency metric name.
pub const METRIC_MODEL_LOAD_LATENCY: &str = "model_load_latency_ms";
/// Predictions counter metric name.
pub const METRIC_PREDICTIONS: &str = "predictions_total";
/// High-risk predictions counter metric name.
pub const METRIC_HIGH_RISK_PREDICTIONS: &str = "high_risk_predictions_total";
/// Rejected request bodies counter metric name.
pub const METRIC_VALIDATION_FAILURES: &str = "validation_failures_total";
/// Model loads counter metric name.
pub const METRIC_MODEL_LOADS: &str = "model_loads_total";

/// Install the global Prometheus recorder and describe all metrics.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_PREDICTION_LATENCY,
        "Prediction latency in milliseconds"
    );
    describe_histogram!(
        METRIC_MODEL_LOAD_LATENCY,
        "Model artifact load latency in milliseconds"
    );

    describe_counter!(METRIC_PREDICTIONS, "Total number of predictions served");
    describe_counter!(
        METRIC_HIGH_RISK_PREDICTIONS,
        "Total number of predictions labelled high risk"
    );
    describe_counter!(
        METRIC_VALIDATION_FAILURES,
        "Total number of prediction requests rejected at validation"
    );
    describe_counter!(METRIC_MODEL_LOADS, "Total number of model artifact loads");

    debug!("Metrics initialized");
}

/// Record one prediction and its latency.
pub fn record_prediction(start: Instant, high_risk: bool) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_PREDICTION_LATENCY).record(latency_ms);
    counter!(METRIC_PREDICTIONS).increment(1);
    if high_risk {
        counter!(METRIC_HIGH_RISK_PREDICTIONS).increment(1);
    }
}

/// Record one model load and its latency.
pub fn record_model_load(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_MODEL_LOAD_LATENCY).record(latency_ms);
    counter!(METRIC_MODEL_LOADS).increment(1);
}

/// Increment rejected request counter.
pub fn inc_validation_failures() {
    counter!(METRIC_VALIDATION_FAILURES).increment(1);
}
