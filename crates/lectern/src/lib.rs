//! # Lectern
//!
//! Generates, enriches, caches and serves a Swagger 2.0 style descriptor
//! document for a running service.
//!
//! - **Enrichment**: type and property summaries pulled from XML documentation
//! - **Caching**: one document per process, answered with `304` when fresh
//! - **Negotiation**: `Accept` picks the formatter, `x-` extensions stay siblings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lectern::config::ConfigLoader;
//! use lectern::Application;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_file("lectern.toml")?.load()?;
//!     Application::from_config(config)?.into_server()?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! GET /swagger/docs/{apiVersion}
//!   -> If-Modified-Since fresh?  -> 304
//!   -> cache hit or generate -> enrich -> cache
//!   -> negotiate formatter -> 200 + Last-Modified
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;

pub use app::{Application, Summary};

/// Descriptor document model, enrichment and caching.
pub use lectern_docs as docs;

/// HTTP server and content responder.
pub use lectern_server as server;

/// Layered configuration.
pub use lectern_config as config;

/// Logging and metrics.
pub use lectern_telemetry as telemetry;

/// Version of the Lectern crates.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
