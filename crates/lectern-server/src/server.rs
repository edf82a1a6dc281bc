//! HTTP server.
//!
//! A hyper HTTP/1 server on tokio: one task per connection, the descriptor
//! responder on the blocking pool, and graceful draining on shutdown.
//!
//! ```rust,ignore
//! use lectern_server::{DocsResponder, Server, ServerConfig};
//!
//! let server = Server::builder(responder)
//!     .config(ServerConfig::builder().http_addr("0.0.0.0:8080").build())
//!     .build()?;
//!
//! server.run().await?;
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use lectern_telemetry::{record_docs_request, render_metrics, InFlightGuard};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::health::{HealthCheck, ReadinessCheck};
use crate::responder::{resolve_root_url, DocsResponder};
use crate::response::{error_response, json_response, HttpResponse};
use crate::router::{RouteResolution, RouteTarget, Router};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Name of the API version placeholder in the descriptor route.
pub const API_VERSION_PARAM: &str = "apiVersion";

/// Request ID header, echoed back or generated.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";
const MAX_REQUEST_ID_LEN: usize = 128;

/// The Lectern HTTP server.
pub struct Server {
    config: ServerConfig,
    router: Router,
    responder: Arc<DocsResponder>,
    health: HealthCheck,
    readiness: ReadinessCheck,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("router", &self.router)
            .field("readiness", &self.readiness)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Creates a builder around the descriptor responder.
    #[must_use]
    pub fn builder(responder: DocsResponder) -> ServerBuilder {
        ServerBuilder::new(responder)
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The readiness probe.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessCheck {
        &self.readiness
    }

    /// The descriptor responder.
    #[must_use]
    pub fn responder(&self) -> &DocsResponder {
        &self.responder
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::BindError` if the address is invalid or taken.
    pub async fn run(self) -> ServerResult<()> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::BindError` if the address is invalid or taken.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::BindError(format!(
                "Invalid address '{}': {}",
                self.config.http_addr(),
                e
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("Failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::IoError` if the listener has no local address.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::IoError(e.to_string()))?;
        tracing::info!(
            addr = %local_addr,
            route = self.config.docs_route(),
            "Lectern listening"
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                server.handle_connection(stream, remote_addr, shutdown).await;
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        server.readiness.set_ready(false);

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            connections = tracker.active_connections(),
            "draining connections"
        );

        tokio::select! {
            () = tracker.wait_for_shutdown() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    connections = tracker.active_connections(),
                    "shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        let result = tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.as_mut().await
            }
        };

        if let Err(e) = result {
            tracing::debug!(remote = %remote_addr, error = %e, "connection closed with error");
        }
    }

    /// Handles one request. Only the method, path and headers are read.
    pub async fn handle<B>(&self, req: Request<B>) -> HttpResponse {
        let started = Instant::now();
        let _in_flight = InFlightGuard::new();
        let (parts, _) = req.into_parts();
        let request_id = request_id(&parts.headers);
        let path = parts.uri.path().to_string();

        tracing::debug!(
            request_id = %request_id,
            http.method = %parts.method,
            http.path = %path,
            "request received"
        );

        let (target, mut response) = match self.router.resolve(&parts.method, &path) {
            RouteResolution::Matched(route) => {
                let target = route.target();
                tracing::trace!(request_id = %request_id, route = target.as_str(), "route matched");
                let response = match target {
                    RouteTarget::Docs => {
                        let version = route.param(API_VERSION_PARAM).unwrap_or_default();
                        self.serve_docs(parts.headers, version.to_string()).await
                    }
                    RouteTarget::Health => json_response(StatusCode::OK, &self.health.status()),
                    RouteTarget::Ready => self.handle_ready(),
                    RouteTarget::Metrics => handle_metrics(),
                };
                (Some(target), response)
            }
            RouteResolution::MethodNotAllowed { allowed } => {
                (None, method_not_allowed(&parts.method, &allowed))
            }
            RouteResolution::NotFound => (
                None,
                error_response(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    &format!("No route for {path}"),
                ),
            ),
        };

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(X_REQUEST_ID.clone(), value);
        }

        let elapsed = started.elapsed();
        let status = response.status().as_u16();
        if target == Some(RouteTarget::Docs) {
            record_docs_request(status, elapsed);
        }
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        lectern_telemetry::log_request_complete!(
            request_id,
            parts.method,
            path,
            status,
            duration_ms
        );

        response
    }

    async fn serve_docs(&self, headers: HeaderMap, api_version: String) -> HttpResponse {
        let root_url = resolve_root_url(self.config.root_url(), &headers);
        let responder = Arc::clone(&self.responder);
        let task = tokio::task::spawn_blocking(move || {
            responder.respond(&headers, &api_version, &root_url)
        });

        match tokio::time::timeout(self.config.request_timeout(), task).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "descriptor task failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "descriptor generation failed unexpectedly",
                )
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.config.request_timeout(),
                    "descriptor request timed out"
                );
                error_response(
                    StatusCode::GATEWAY_TIMEOUT,
                    "REQUEST_TIMEOUT",
                    "descriptor generation timed out",
                )
            }
        }
    }

    fn handle_ready(&self) -> HttpResponse {
        let status = self.readiness.status();
        let code = if status.is_ready() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(code, &status)
    }
}

fn handle_metrics() -> HttpResponse {
    match render_metrics() {
        Some(text) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)
            .body(text.into())
            .unwrap_or_else(|_| {
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "failed to build metrics response",
                )
            }),
        None => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "METRICS_DISABLED",
            "metrics recorder is not installed",
        ),
    }
}

fn method_not_allowed(method: &Method, allowed: &[Method]) -> HttpResponse {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "METHOD_NOT_ALLOWED",
        &format!("Method {method} is not allowed"),
    );
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::now_v7().to_string(), str::to_string)
}

/// Builder for [`Server`].
#[derive(Debug)]
pub struct ServerBuilder {
    config: ServerConfig,
    responder: DocsResponder,
    health: HealthCheck,
    readiness: ReadinessCheck,
    metrics_endpoint: bool,
}

impl ServerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new(responder: DocsResponder) -> Self {
        Self {
            config: ServerConfig::default(),
            responder,
            health: HealthCheck::new("lectern", env!("CARGO_PKG_VERSION")),
            readiness: ReadinessCheck::new(),
            metrics_endpoint: true,
        }
    }

    /// Sets the server configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the name and version reported by `/health`.
    #[must_use]
    pub fn service(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.health = HealthCheck::new(name, version);
        self
    }

    /// Sets the readiness probe.
    #[must_use]
    pub fn readiness(mut self, readiness: ReadinessCheck) -> Self {
        self.readiness = readiness;
        self
    }

    /// Enables or disables `GET /metrics`.
    #[must_use]
    pub fn metrics_endpoint(mut self, enabled: bool) -> Self {
        self.metrics_endpoint = enabled;
        self
    }

    /// Builds the server and its routing table.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidRoute` if the descriptor route is
    /// malformed or lacks the `{apiVersion}` placeholder.
    pub fn build(self) -> ServerResult<Server> {
        let docs_route = self.config.docs_route().to_string();
        if !docs_route.contains(&format!("{{{API_VERSION_PARAM}}}")) {
            return Err(ServerError::invalid_route(
                docs_route,
                format!("must contain {{{API_VERSION_PARAM}}}"),
            ));
        }

        let mut router = Router::new();
        router.add_route(Method::GET, &docs_route, RouteTarget::Docs)?;
        router.add_route(Method::GET, "/health", RouteTarget::Health)?;
        router.add_route(Method::GET, "/ready", RouteTarget::Ready)?;
        if self.metrics_endpoint {
            router.add_route(Method::GET, "/metrics", RouteTarget::Metrics)?;
        }

        Ok(Server {
            config: self.config,
            router,
            responder: Arc::new(self.responder),
            health: self.health,
            readiness: self.readiness,
        })
    }
}
