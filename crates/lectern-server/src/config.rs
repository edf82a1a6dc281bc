//! Runtime server settings.
//!
//! ```rust
//! use lectern_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:8080")
//!     .docs_route("/api-docs/{apiVersion}")
//!     .shutdown_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.docs_route(), "/api-docs/{apiVersion}");
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default descriptor route.
pub const DEFAULT_DOCS_ROUTE: &str = "/swagger/docs/{apiVersion}";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    http_addr: String,
    docs_route: String,
    root_url: Option<String>,
    shutdown_timeout: Duration,
    request_timeout: Duration,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses the HTTP address as a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns the descriptor route template.
    #[must_use]
    pub fn docs_route(&self) -> &str {
        &self.docs_route
    }

    /// Returns the fixed root URL, if one is configured.
    #[must_use]
    pub fn root_url(&self) -> Option<&str> {
        self.root_url.as_deref()
    }

    /// Returns the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    http_addr: Option<String>,
    docs_route: Option<String>,
    root_url: Option<String>,
    shutdown_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl ServerConfigBuilder {
    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = Some(addr.into());
        self
    }

    /// Sets the descriptor route template.
    #[must_use]
    pub fn docs_route(mut self, route: impl Into<String>) -> Self {
        self.docs_route = Some(route.into());
        self
    }

    /// Sets a fixed root URL. An empty string clears it.
    #[must_use]
    pub fn root_url(mut self, root_url: impl Into<String>) -> Self {
        let root_url = root_url.into();
        self.root_url = (!root_url.is_empty()).then_some(root_url);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self
                .http_addr
                .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
            docs_route: self
                .docs_route
                .unwrap_or_else(|| DEFAULT_DOCS_ROUTE.to_string()),
            root_url: self.root_url,
            shutdown_timeout: self
                .shutdown_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS)),
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), DEFAULT_HTTP_ADDR);
        assert_eq!(config.docs_route(), DEFAULT_DOCS_ROUTE);
        assert!(config.root_url().is_none());
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::builder().http_addr("127.0.0.1:3000").build();
        assert_eq!(config.socket_addr().unwrap().port(), 3000);

        let bad = ServerConfig::builder().http_addr("localhost").build();
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_empty_root_url_is_unset() {
        let config = ServerConfig::builder().root_url("").build();
        assert!(config.root_url().is_none());

        let config = ServerConfig::builder()
            .root_url("https://api.example.com")
            .build();
        assert_eq!(config.root_url(), Some("https://api.example.com"));
    }
}
