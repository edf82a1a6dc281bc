//! Main configuration types.
//!
//! This module provides the top-level [`LecternConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::schema::API_VERSION_PLACEHOLDER;
use crate::{ConfigError, DocsConfig, LogFormat, ServerConfig, TelemetryConfigSection};

/// Complete Lectern configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use lectern_config::LecternConfig;
///
/// let config = LecternConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.docs.route, "/swagger/docs/{apiVersion}");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct LecternConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Descriptor endpoint configuration.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Telemetry configuration (metrics, logging).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl LecternConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use lectern_config::{DocsConfig, LecternConfig};
    ///
    /// let config = LecternConfig::builder()
    ///     .docs(DocsConfig {
    ///         no_caching: true,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert!(config.docs.no_caching);
    /// ```
    #[must_use]
    pub fn builder() -> LecternConfigBuilder {
        LecternConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The server address is not a socket address
    /// - The request timeout is zero
    /// - The descriptor route does not start with `/` or does not contain
    ///   `{apiVersion}` exactly once
    /// - The root URL is set but is not an absolute `http`/`https` URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        let route = &self.docs.route;
        if !route.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "docs.route",
                format!("must start with '/': {route}"),
            ));
        }
        if route.matches(API_VERSION_PLACEHOLDER).count() != 1 {
            return Err(ConfigError::invalid_value(
                "docs.route",
                format!("must contain {API_VERSION_PLACEHOLDER} exactly once: {route}"),
            ));
        }

        if let Some(root_url) = &self.docs.root_url {
            let scheme_ok = root_url.starts_with("http://") || root_url.starts_with("https://");
            let host = root_url.split("://").nth(1).unwrap_or_default();
            if !scheme_ok || host.is_empty() {
                return Err(ConfigError::invalid_value(
                    "docs.root_url",
                    format!("expected an absolute http(s) URL: {root_url}"),
                ));
            }
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty, colored debug logs and no caching so edits to the descriptor
    /// table show up on the next request.
    ///
    /// # Example
    ///
    /// ```
    /// use lectern_config::LecternConfig;
    ///
    /// let config = LecternConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// assert!(config.docs.no_caching);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;

        config.docs.no_caching = true;
        config.docs.json_formatting = lectern_docs::JsonFormatting::Indented;

        config
    }

    /// Create a production configuration preset.
    ///
    /// # Example
    ///
    /// ```
    /// use lectern_config::LecternConfig;
    ///
    /// let config = LecternConfig::production();
    /// assert_eq!(config.telemetry.logging.format, lectern_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;

        config.docs.no_caching = false;
        config.docs.json_formatting = lectern_docs::JsonFormatting::Compact;

        config
    }
}

/// Builder for [`LecternConfig`].
#[derive(Debug, Default)]
pub struct LecternConfigBuilder {
    server: Option<ServerConfig>,
    docs: Option<DocsConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl LecternConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the descriptor endpoint configuration.
    #[must_use]
    pub fn docs(mut self, docs: DocsConfig) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> LecternConfig {
        LecternConfig {
            server: self.server.unwrap_or_default(),
            docs: self.docs.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<LecternConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_docs(docs: DocsConfig) -> LecternConfig {
        LecternConfig::builder().docs(docs).build()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = LecternConfig::default();
        assert_eq!(config.telemetry.service_name, "lectern");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_keeps_defaults_for_unset_sections() {
        let config = LecternConfig::builder()
            .server(ServerConfig {
                http_addr: "127.0.0.1:3000".to_string(),
                ..Default::default()
            })
            .build();

        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.docs, DocsConfig::default());
    }

    #[test]
    fn test_validate_invalid_server_addr() {
        let config = LecternConfig::builder()
            .server(ServerConfig {
                http_addr: "not-an-address".to_string(),
                ..Default::default()
            })
            .build();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http_addr"));
    }

    #[test]
    fn test_validate_zero_request_timeout() {
        let config = LecternConfig::builder()
            .server(ServerConfig {
                request_timeout_ms: 0,
                ..Default::default()
            })
            .build();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_route_without_placeholder() {
        let config = with_docs(DocsConfig {
            route: "/swagger/docs".to_string(),
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("docs.route"));
    }

    #[test]
    fn test_validate_route_with_placeholder_twice() {
        let config = with_docs(DocsConfig {
            route: "/{apiVersion}/docs/{apiVersion}".to_string(),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_relative_route() {
        let config = with_docs(DocsConfig {
            route: "docs/{apiVersion}".to_string(),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_custom_route() {
        let config = with_docs(DocsConfig {
            route: "/api-docs/{apiVersion}/swagger.json".to_string(),
            ..Default::default()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_root_url() {
        let good = with_docs(DocsConfig {
            root_url: Some("https://api.example.com/shop".to_string()),
            ..Default::default()
        });
        assert!(good.validate().is_ok());

        let bad = with_docs(DocsConfig {
            root_url: Some("api.example.com".to_string()),
            ..Default::default()
        });
        assert!(bad.validate().unwrap_err().to_string().contains("root_url"));

        let empty_host = with_docs(DocsConfig {
            root_url: Some("https://".to_string()),
            ..Default::default()
        });
        assert!(empty_host.validate().is_err());
    }

    #[test]
    fn test_development_preset() {
        let config = LecternConfig::development();
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
        assert!(config.telemetry.logging.ansi_enabled);
        assert!(config.docs.no_caching);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_preset() {
        let config = LecternConfig::production();
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
        assert!(!config.docs.no_caching);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_validated_failure() {
        let result = LecternConfig::builder()
            .docs(DocsConfig {
                route: "/docs".to_string(),
                ..Default::default()
            })
            .build_validated();
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = LecternConfig::development();
        let text = toml::to_string(&config).unwrap();
        let parsed: LecternConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<LecternConfig, _> = toml::from_str(
            r#"
            [docs]
            no_cache = true
        "#,
        );
        assert!(result.is_err());
    }
}
