//! Layered configuration loading.
//!
//! Later layers override earlier ones:
//! 1. Default values (built into the code)
//! 2. Configuration file (TOML or JSON)
//! 3. `.env` file, when requested
//! 4. Environment variables (`PREFIX__SECTION__KEY`)

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, LecternConfig, LogFormat};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "LECTERN";

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use lectern_config::ConfigLoader;
///
/// # fn main() -> Result<(), lectern_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("lectern.toml")?
///     .with_env_prefix("LECTERN")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: LecternConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: LecternConfig::default(),
            env_prefix: None,
            file_loaded: false,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = LecternConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// ```
    /// use lectern_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(config.docs.no_caching);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = LecternConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = LecternConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, is not
    /// valid TOML/JSON, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let file_config = Self::parse_file(&content, path)?;
        self.merge_config(file_config);
        self.file_loaded = true;

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use lectern_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [docs]
    ///     cors_allow_origin = "*"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.docs.cors_allow_origin.as_deref(), Some("*"));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let file_config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };

        self.merge_config(file_config);
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `LECTERN`:
    /// - `LECTERN__SERVER__HTTP_ADDR=0.0.0.0:9000`
    /// - `LECTERN__DOCS__NO_CACHING=true`
    /// - `LECTERN__DOCS__DOCUMENTATION_PATHS=Shop.Api.xml,Shop.Models.xml`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if a `.env` file exists but is
    /// malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::validation_error(format!(
                "failed to load .env file: {e}"
            ))),
        }
    }

    /// Whether a configuration file has been loaded.
    #[must_use]
    pub fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// the final configuration is invalid.
    pub fn load(mut self) -> Result<LecternConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> LecternConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<LecternConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // Sections are serde-defaulted, so a file replaces the whole config.
    fn merge_config(&mut self, file_config: LecternConfig) {
        self.config = file_config;
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(key_without_prefix) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__"))
        else {
            // Shares the prefix but not the separator, e.g. LECTERN_HOME.
            return Ok(());
        };

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            // Server section
            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_integer(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                self.config.server.request_timeout_ms = parse_integer(key, value)?;
            }

            // Docs section
            ["DOCS", "ROUTE"] => {
                self.config.docs.route = value.to_string();
            }
            ["DOCS", "NO_CACHING"] => {
                self.config.docs.no_caching = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["DOCS", "CORS_ALLOW_ORIGIN"] => {
                self.config.docs.cors_allow_origin = non_empty(value);
            }
            ["DOCS", "JSON_FORMATTING"] => {
                self.config.docs.json_formatting = value.parse().map_err(|_| {
                    ConfigError::env_parse_error(key, "expected 'compact' or 'indented'")
                })?;
            }
            ["DOCS", "ROOT_URL"] => {
                self.config.docs.root_url = non_empty(value);
            }
            ["DOCS", "DESCRIPTOR_PATH"] => {
                self.config.docs.descriptor_path = non_empty(value).map(PathBuf::from);
            }
            ["DOCS", "DOCUMENTATION_PATHS"] => {
                self.config.docs.documentation_paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }

            // Telemetry section
            ["TELEMETRY", "SERVICE_NAME"] => {
                self.config.telemetry.service_name = value.to_string();
            }
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                self.config.telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                self.config.telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                self.config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                self.config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "ANSI_ENABLED"] => {
                self.config.telemetry.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                self.config.telemetry.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            _ => {
                return Err(ConfigError::env_parse_error(
                    key,
                    "unknown configuration key",
                ))
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_integer(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_docs::JsonFormatting;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_new_loader_uses_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, LecternConfig::default());
    }

    #[test]
    fn test_with_toml_file() {
        let file = temp_file(
            r#"
            [server]
            http_addr = "127.0.0.1:4000"

            [docs]
            no_caching = true
            json_formatting = "indented"
        "#,
            ".toml",
        );

        let loader = ConfigLoader::new().with_file(file.path()).unwrap();
        assert!(loader.file_loaded());
        let config = loader.load().unwrap();

        assert_eq!(config.server.http_addr, "127.0.0.1:4000");
        assert!(config.docs.no_caching);
        assert_eq!(config.docs.json_formatting, JsonFormatting::Indented);
    }

    #[test]
    fn test_with_json_file() {
        let file = temp_file(
            r#"{"docs": {"cors_allow_origin": "*", "route": "/docs/{apiVersion}"}}"#,
            ".json",
        );

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.docs.cors_allow_origin.as_deref(), Some("*"));
        assert_eq!(config.docs.route, "/docs/{apiVersion}");
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new().with_file("/nonexistent/lectern.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_optional_missing_file() {
        let loader = ConfigLoader::new()
            .with_optional_file("/nonexistent/lectern.toml")
            .unwrap();
        assert!(!loader.file_loaded());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_file("server: {}", ".yaml");
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_field_in_file() {
        let file = temp_file("[docs]\ncache = false\n", ".toml");
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_with_string_unsupported_format() {
        assert!(ConfigLoader::new().with_string("", "ini").is_err());
    }

    #[test]
    fn test_env_server_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SERVER__HTTP_ADDR", "127.0.0.1:9999", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "5", "TEST")
            .unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.server.http_addr, "127.0.0.1:9999");
        assert_eq!(config.server.shutdown_timeout_secs, 5);
    }

    #[test]
    fn test_env_docs_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__DOCS__NO_CACHING", "yes", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__DOCS__JSON_FORMATTING", "Indented", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__DOCS__CORS_ALLOW_ORIGIN", "https://a.example", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__DOCS__DOCUMENTATION_PATHS", "a.xml, b.xml,", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__DOCS__ROOT_URL", "", "TEST")
            .unwrap();

        let config = loader.load_unvalidated();
        assert!(config.docs.no_caching);
        assert_eq!(config.docs.json_formatting, JsonFormatting::Indented);
        assert_eq!(
            config.docs.cors_allow_origin.as_deref(),
            Some("https://a.example")
        );
        assert_eq!(
            config.docs.documentation_paths,
            vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")]
        );
        assert!(config.docs.root_url.is_none());
    }

    #[test]
    fn test_env_telemetry_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__TELEMETRY__SERVICE_NAME", "shop-docs", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "PRETTY", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "off", "TEST")
            .unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.telemetry.service_name, "shop-docs");
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
        assert!(!config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_env_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__DOCS__NO_CACHING", "maybe", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__SERVER__REQUEST_TIMEOUT_MS", "soon", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__DOCS__JSON_FORMATTING", "tabs", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
    }

    #[test]
    fn test_env_unknown_key() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_var("TEST__DOCS__CACHE", "true", "TEST")
            .unwrap_err();
        assert!(err.to_string().contains("TEST__DOCS__CACHE"));
    }

    #[test]
    fn test_env_prefix_without_separator_is_ignored() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("TESTING", "1", "TEST").is_ok());
        assert_eq!(loader.load_unvalidated(), LecternConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__DOCS__ROUTE", "/docs", "TEST")
            .unwrap();
        assert!(loader.load().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nope"), None);
    }
}
