//! Serves descriptor documents with freshness checks, negotiation and CORS.
//!
//! Per request:
//! 1. `If-Modified-Since` at or after the cached generation time: `304`.
//! 2. Fetch the document, regenerating when caching is disabled.
//! 3. Negotiate a formatter from `Accept`.
//! 4. `200` with `Content-Type`, `Last-Modified` and the optional
//!    `Access-Control-Allow-Origin` header.
//!
//! An unknown API version is answered with `404`. Anything else that goes
//! wrong is a `500`.

use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{
    ACCEPT, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HOST, IF_MODIFIED_SINCE, LAST_MODIFIED,
};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use lectern_docs::{DocsError, DocumentPipeline, SharedFormatter};
use serde_json::{Map, Value};

use crate::negotiate::negotiate;
use crate::response::{empty_response, error_response, error_response_with, HttpResponse};

/// Root URL used when neither configuration nor the request provides one.
pub const FALLBACK_ROOT_URL: &str = "http://localhost";

/// Responder behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponderOptions {
    /// Regenerate the document on every request.
    pub no_caching: bool,
    /// `Access-Control-Allow-Origin` value. `None` or empty omits the header.
    pub cors_allow_origin: Option<String>,
}

/// Answers descriptor document requests.
///
/// `respond` is synchronous because generation can be expensive; the
/// server calls it from `spawn_blocking`.
#[derive(Debug)]
pub struct DocsResponder {
    pipeline: Arc<DocumentPipeline>,
    formatters: Vec<SharedFormatter>,
    options: ResponderOptions,
}

impl DocsResponder {
    /// Creates a responder with caching enabled and no CORS header.
    pub fn new(pipeline: Arc<DocumentPipeline>, formatters: Vec<SharedFormatter>) -> Self {
        Self {
            pipeline,
            formatters,
            options: ResponderOptions::default(),
        }
    }

    /// Replaces the responder options.
    #[must_use]
    pub fn with_options(mut self, options: ResponderOptions) -> Self {
        self.options = options;
        self
    }

    /// The document pipeline.
    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    /// Builds the response for `api_version`.
    ///
    /// The version is upper-cased before it reaches the generator.
    pub fn respond(&self, headers: &HeaderMap, api_version: &str, root_url: &str) -> HttpResponse {
        let version = api_version.to_uppercase();

        if let Some(last_modified) = self.pipeline.last_modified(&version) {
            if not_modified_since(headers, last_modified) {
                tracing::debug!(api_version = %version, "descriptor not modified");
                return empty_response(StatusCode::NOT_MODIFIED);
            }
        }

        let record = match self
            .pipeline
            .document(root_url, &version, self.options.no_caching)
        {
            Ok(record) => record,
            Err(DocsError::UnknownApiVersion { version, known }) => {
                tracing::debug!(api_version = %version, ?known, "unknown API version requested");
                return unknown_version_response(&version, &known);
            }
            Err(e) => {
                tracing::error!(api_version = %version, error = %e, "descriptor generation failed");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_FAILED",
                    &e.to_string(),
                );
            }
        };

        let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok());
        let Some(negotiated) = negotiate(accept, &self.formatters) else {
            tracing::error!("no descriptor formatter registered");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "NO_FORMATTER",
                "no formatter is available for descriptor documents",
            );
        };

        let body = match negotiated.formatter.serialize(&record.document) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    api_version = %version,
                    error = %e,
                    "descriptor serialization failed"
                );
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERIALIZATION_ERROR",
                    &e.to_string(),
                );
            }
        };

        self.document_response(body, negotiated.media_type, record.generated_at)
    }

    fn document_response(
        &self,
        body: Bytes,
        media_type: &str,
        generated_at: DateTime<Utc>,
    ) -> HttpResponse {
        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, format!("{media_type}; charset=utf-8"))
            .header(
                LAST_MODIFIED,
                httpdate::fmt_http_date(SystemTime::from(generated_at)),
            );

        if let Some(origin) = self
            .options
            .cors_allow_origin
            .as_deref()
            .filter(|origin| !origin.is_empty())
        {
            match HeaderValue::from_str(origin) {
                Ok(value) => builder = builder.header(ACCESS_CONTROL_ALLOW_ORIGIN, value),
                Err(_) => tracing::warn!(origin, "CORS origin is not a valid header value"),
            }
        }

        builder.body(Full::new(body)).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to build descriptor response");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "failed to build response",
            )
        })
    }
}

fn not_modified_since(headers: &HeaderMap, last_modified: DateTime<Utc>) -> bool {
    headers
        .get(IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok())
        .is_some_and(|since| since >= SystemTime::from(last_modified))
}

fn unknown_version_response(version: &str, known: &[String]) -> HttpResponse {
    let mut details = Map::new();
    details.insert("api_version".to_string(), Value::from(version));
    details.insert("known_versions".to_string(), Value::from(known.to_vec()));
    error_response_with(
        StatusCode::NOT_FOUND,
        "UNKNOWN_API_VERSION",
        &format!("Unknown API version '{version}'"),
        details,
    )
}

/// Root URL handed to the generator.
///
/// A configured URL wins (without its trailing slash), then `http://{Host}`
/// from the request, then [`FALLBACK_ROOT_URL`].
pub fn resolve_root_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(root_url) = configured.filter(|url| !url.is_empty()) {
        return root_url.trim_end_matches('/').to_string();
    }

    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map_or_else(|| FALLBACK_ROOT_URL.to_string(), |host| format!("http://{host}"))
}
