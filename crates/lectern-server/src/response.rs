//! Response helpers shared by the built-in endpoints and the responder.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// JSON content type used for error envelopes and status endpoints.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Builds a `{"error":{"code","message"}}` envelope.
pub fn error_response(status: StatusCode, code: &str, message: &str) -> HttpResponse {
    error_response_with(status, code, message, Map::new())
}

/// Builds an error envelope with additional fields next to `code` and `message`.
pub fn error_response_with(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Map<String, Value>,
) -> HttpResponse {
    let mut error = Map::new();
    error.insert("code".to_string(), Value::from(code));
    error.insert("message".to_string(), Value::from(message));
    error.extend(details);

    let body = json!({ "error": error });
    json_response(status, &body)
}

/// Serializes `value` as the JSON body of a response.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    let body = serde_json::to_vec(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize response body");
        br#"{"error":{"code":"INTERNAL_ERROR","message":"response serialization failed"}}"#
            .to_vec()
    });

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// An empty-bodied response.
pub fn empty_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
