//! Configuration sections.

use std::path::PathBuf;

use lectern_docs::JsonFormatting;
use serde::{Deserialize, Serialize};

/// Placeholder the descriptor route must contain.
pub const API_VERSION_PLACEHOLDER: &str = "{apiVersion}";

/// HTTP server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP listen address.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

/// Descriptor endpoint configuration section.
///
/// ```toml
/// [docs]
/// route = "/swagger/docs/{apiVersion}"
/// no_caching = false
/// cors_allow_origin = "*"
/// json_formatting = "indented"
/// descriptor_path = "types.toml"
/// documentation_paths = ["Shop.Api.xml", "Shop.Models.xml"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Route template; must contain `{apiVersion}` exactly once.
    #[serde(default = "default_route")]
    pub route: String,

    /// Regenerate the document on every request.
    #[serde(default)]
    pub no_caching: bool,

    /// Value for `Access-Control-Allow-Origin`. Empty means no header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_allow_origin: Option<String>,

    /// Layout of the JSON output.
    #[serde(default)]
    pub json_formatting: JsonFormatting,

    /// Fixed root URL. Derived from the `Host` header when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,

    /// Descriptor table (TOML or JSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor_path: Option<PathBuf>,

    /// XML documentation files, merged in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documentation_paths: Vec<PathBuf>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            route: default_route(),
            no_caching: false,
            cors_allow_origin: None,
            json_formatting: JsonFormatting::default(),
            root_url: None,
            descriptor_path: None,
            documentation_paths: Vec::new(),
        }
    }
}

impl DocsConfig {
    /// The CORS origin to emit, if any.
    #[must_use]
    pub fn effective_cors_origin(&self) -> Option<&str> {
        self.cors_allow_origin
            .as_deref()
            .filter(|origin| !origin.is_empty())
    }
}

fn default_route() -> String {
    "/swagger/docs/{apiVersion}".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. `info` or `lectern_docs=debug,info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name for logs and the `service` metrics label.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TelemetryConfigSection {
    /// Converts this section into the telemetry crate's runtime configuration.
    #[must_use]
    pub fn to_telemetry_config(&self) -> lectern_telemetry::TelemetryConfig {
        let logging = lectern_telemetry::LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            output: match self.logging.format {
                LogFormat::Json => lectern_telemetry::LogOutput::Json,
                LogFormat::Pretty => lectern_telemetry::LogOutput::Pretty,
            },
            location: self.logging.include_location,
            ansi: self.logging.ansi_enabled,
            ..lectern_telemetry::LogConfig::default()
        };
        let metrics = lectern_telemetry::MetricsConfig {
            enabled: self.metrics.enabled,
            ..lectern_telemetry::MetricsConfig::default()
        };

        lectern_telemetry::TelemetryConfig::builder()
            .service_name(&self.service_name)
            .logging(logging)
            .metrics(metrics)
            .build()
    }
}

fn default_service_name() -> String {
    "lectern".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_server_config_unknown_field_rejected() {
        let result: Result<ServerConfig, _> = toml::from_str(
            r#"
            http_addr = "127.0.0.1:3000"
            max_connections = 5
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_docs_config_default() {
        let config = DocsConfig::default();
        assert_eq!(config.route, "/swagger/docs/{apiVersion}");
        assert!(!config.no_caching);
        assert_eq!(config.json_formatting, JsonFormatting::Compact);
        assert!(config.effective_cors_origin().is_none());
    }

    #[test]
    fn test_docs_config_deserialize() {
        let config: DocsConfig = toml::from_str(
            r#"
            no_caching = true
            cors_allow_origin = "https://editor.example.com"
            json_formatting = "indented"
            documentation_paths = ["a.xml", "b.xml"]
        "#,
        )
        .unwrap();

        assert!(config.no_caching);
        assert_eq!(
            config.effective_cors_origin(),
            Some("https://editor.example.com")
        );
        assert_eq!(config.json_formatting, JsonFormatting::Indented);
        assert_eq!(config.documentation_paths.len(), 2);
        assert_eq!(config.route, "/swagger/docs/{apiVersion}");
    }

    #[test]
    fn test_empty_cors_origin_is_not_emitted() {
        let config = DocsConfig {
            cors_allow_origin: Some(String::new()),
            ..Default::default()
        };
        assert!(config.effective_cors_origin().is_none());
    }

    #[test]
    fn test_logging_format_deserialize() {
        let config: LoggingConfig = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_to_telemetry_config() {
        let section = TelemetryConfigSection {
            service_name: "shop-docs".to_string(),
            logging: LoggingConfig {
                format: LogFormat::Pretty,
                include_location: true,
                ..Default::default()
            },
            metrics: MetricsConfig { enabled: false },
        };

        let telemetry = section.to_telemetry_config();
        assert_eq!(telemetry.service_name, "shop-docs");
        assert_eq!(telemetry.logging.output, lectern_telemetry::LogOutput::Pretty);
        assert!(telemetry.logging.location);
        assert!(!telemetry.metrics.enabled);
        assert_eq!(telemetry.metrics.service_name, "shop-docs");
    }
}
