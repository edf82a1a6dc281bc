//! Server error types.

use thiserror::Error;

/// Errors that can occur while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("Bind error: {0}")]
    BindError(String),

    /// I/O error on the listener.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The descriptor route template is unusable.
    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute {
        /// The rejected template.
        route: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ServerError {
    /// Creates an invalid route error.
    pub fn invalid_route(route: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            route: route.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let bind = ServerError::BindError("address in use".to_string());
        assert!(bind.to_string().contains("Bind error"));

        let route = ServerError::invalid_route("/docs", "missing {apiVersion}");
        assert!(route.to_string().contains("/docs"));
        assert!(route.to_string().contains("missing {apiVersion}"));
    }
}
