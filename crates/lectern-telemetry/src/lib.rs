//! Observability for Lectern.
//!
//! - **Logging**: structured JSON or human-readable logs via `tracing-subscriber`
//! - **Metrics**: Prometheus-format metrics via the `metrics` crate
//!
//! # Example
//!
//! ```rust,ignore
//! use lectern_telemetry::{TelemetryConfig, init_telemetry};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("shop-docs")
//!     .build();
//!
//! init_telemetry(&config)?;
//! ```
//!
//! # Metrics Endpoint
//!
//! The server exposes the recorder's output on `/metrics`:
//!
//! ```text
//! # HELP lectern_docs_requests_total Total number of descriptor document requests by response status
//! # TYPE lectern_docs_requests_total counter
//! lectern_docs_requests_total{service="shop-docs",status="200"} 42
//! lectern_docs_requests_total{service="shop-docs",status="304"} 17
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogOutput};
pub use metrics::{init_metrics, record_docs_request, render_metrics, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
