//! # Lectern Server
//!
//! HTTP server that serves Lectern descriptor documents.
//!
//! This crate provides:
//!
//! - HTTP/1.1 support via Hyper
//! - Routing for the descriptor, health, readiness and metrics endpoints
//! - `Accept` based formatter negotiation
//! - Conditional `If-Modified-Since` handling against the document cache
//! - Graceful shutdown with connection draining
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lectern_docs::{default_formatters, DocumentPipeline, JsonFormatting};
//! use lectern_server::{DocsResponder, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Arc::new(DocumentPipeline::new(generator));
//!     let responder = DocsResponder::new(pipeline, default_formatters(JsonFormatting::Compact));
//!
//!     Server::builder(responder)
//!         .config(ServerConfig::builder().http_addr("0.0.0.0:8080").build())
//!         .build()?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod health;
mod negotiate;
mod responder;
mod response;
mod router;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_DOCS_ROUTE, DEFAULT_HTTP_ADDR,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::{ServerError, ServerResult};
pub use health::{HealthCheck, HealthStatus, ReadinessCheck, ReadinessStatus};
pub use negotiate::{negotiate, parse_accept, MediaRange, Negotiated};
pub use responder::{resolve_root_url, DocsResponder, ResponderOptions, FALLBACK_ROOT_URL};
pub use response::{
    empty_response, error_response, error_response_with, json_response, HttpResponse,
    ResponseBody, JSON_CONTENT_TYPE,
};
pub use router::{RouteMatch, RouteResolution, RouteTarget, Router};
pub use server::{Server, ServerBuilder, API_VERSION_PARAM, X_REQUEST_ID};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
