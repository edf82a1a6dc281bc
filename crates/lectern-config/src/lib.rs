//! Typed configuration for Lectern.
//!
//! - TOML and JSON configuration files
//! - `.env` files via `dotenvy`
//! - Environment variable overrides (`LECTERN__SECTION__KEY`)
//! - Strict parsing: unknown fields are rejected
//!
//! # Example
//!
//! ```no_run
//! use lectern_config::ConfigLoader;
//!
//! # fn main() -> Result<(), lectern_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("lectern.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("LECTERN")
//!     .load()?;
//!
//! println!("serving {} on {}", config.docs.route, config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//!
//! [docs]
//! route = "/swagger/docs/{apiVersion}"
//! no_caching = false
//! cors_allow_origin = "*"
//! json_formatting = "compact"
//! descriptor_path = "types.toml"
//! documentation_paths = ["Shop.Api.xml"]
//!
//! [telemetry]
//! service_name = "shop-docs"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{LecternConfig, LecternConfigBuilder};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    DocsConfig, LogFormat, LoggingConfig, MetricsConfig, ServerConfig, TelemetryConfigSection,
    API_VERSION_PLACEHOLDER,
};

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
