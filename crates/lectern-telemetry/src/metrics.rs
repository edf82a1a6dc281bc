//! Prometheus metrics for Lectern.
//!
//! Installs a `metrics-exporter-prometheus` recorder and keeps its handle so
//! the server can render the text exposition format on `/metrics`.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `lectern_docs_requests_total` | Counter | `status` | Descriptor requests |
//! | `lectern_docs_request_duration_seconds` | Histogram | - | Descriptor request latency |
//! | `lectern_docs_not_modified_total` | Counter | - | Requests answered with 304 |
//! | `lectern_docs_cache_hits_total` | Counter | - | Documents served from cache |
//! | `lectern_docs_regenerations_total` | Counter | - | Documents generated and enriched |
//! | `lectern_in_flight_requests` | Gauge | - | Requests currently being processed |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const REQUEST_DURATION: &str = "lectern_docs_request_duration_seconds";

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Service name, attached to every metric as the `service` label.
    pub service_name: String,

    /// Histogram buckets for request duration.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "lectern".to_string(),
            // 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Initializes the metrics subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for an empty bucket list and
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .add_global_label("service", &config.service_name)
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "lectern_docs_requests_total",
        "Total number of descriptor document requests by response status"
    );
    describe_histogram!(REQUEST_DURATION, "Descriptor request duration in seconds");
    describe_counter!(
        "lectern_docs_not_modified_total",
        "Descriptor requests answered with 304 Not Modified"
    );
    describe_counter!(
        "lectern_docs_cache_hits_total",
        "Descriptor documents served from the cache"
    );
    describe_counter!(
        "lectern_docs_regenerations_total",
        "Descriptor documents generated and enriched"
    );
    describe_gauge!(
        "lectern_in_flight_requests",
        "Number of HTTP requests currently being processed"
    );
}

/// Records a completed descriptor request.
pub fn record_docs_request(status_code: u16, duration: Duration) {
    counter!("lectern_docs_requests_total", "status" => status_code.to_string()).increment(1);
    histogram!(REQUEST_DURATION).record(duration.as_secs_f64());
    if status_code == 304 {
        counter!("lectern_docs_not_modified_total").increment(1);
    }
}

/// Guard that tracks an in-flight request until dropped.
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!("lectern_in_flight_requests").increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("lectern_in_flight_requests").decrement(1.0);
    }
}
