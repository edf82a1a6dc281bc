//! Structured logging for Lectern.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and a
//! single `fmt` layer that writes either JSON lines or pretty output.
//!
//! ```rust,ignore
//! use lectern_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::pretty())?;
//! tracing::info!(api_version = "V1", "serving descriptor document");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Encoding of emitted log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether a subscriber is installed at all.
    pub enabled: bool,
    /// Filter directive, e.g. `info` or `lectern_docs=debug,hyper=warn`.
    pub level: String,
    /// Line encoding.
    pub output: LogOutput,
    /// Colorize pretty output. Ignored for JSON.
    pub ansi: bool,
    /// Include source file and line.
    pub location: bool,
    /// Reported once when logging starts.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            output: LogOutput::Json,
            ansi: false,
            location: false,
            service_name: "lectern".to_string(),
        }
    }
}

impl LogConfig {
    /// Pretty, colored output at `debug` with source locations.
    #[must_use]
    pub fn pretty() -> Self {
        Self {
            level: "debug".to_string(),
            output: LogOutput::Pretty,
            ansi: true,
            location: true,
            ..Self::default()
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing when `config.enabled` is `false`.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    let layer = match config.output {
        LogOutput::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_file(config.location)
            .with_line_number(config.location)
            .boxed(),
        LogOutput::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_file(config.location)
            .with_line_number(config.location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        output = ?config.output,
        "logging initialized"
    );
    Ok(())
}

/// Parses a filter directive.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Logs the completion of one HTTP request at `info`.
#[macro_export]
macro_rules! log_request_complete {
    ($request_id:expr, $method:expr, $path:expr, $status:expr, $duration_ms:expr) => {
        tracing::info!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            http.status_code = $status,
            duration_ms = $duration_ms,
            "request completed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(config.output, LogOutput::Json);
        assert_eq!(config.level, "info");
        assert_eq!(config.service_name, "lectern");
    }

    #[test]
    fn test_pretty_config() {
        let config = LogConfig::pretty();
        assert_eq!(config.output, LogOutput::Pretty);
        assert!(config.ansi);
        assert!(config.location);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info,lectern_docs=trace").is_ok());
        assert!(create_env_filter("lectern_docs=loudest").is_err());
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_request_complete_without_subscriber() {
        crate::log_request_complete!("req-1", "GET", "/docs/V1", 304_u16, 3_u64);
    }
}
