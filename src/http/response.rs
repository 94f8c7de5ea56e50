//! Response envelope and builder.
//!
//! Every endpoint answers with the same JSON envelope:
//!
//! ```json
//! {"statusCode": 200, "status": "ok", "description": "...", "body": {}}
//! ```
//!
//! `description` appears on the canonical non-2xx constructors, `body` on
//! whatever the handler put there. Both are omitted from the wire when absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    /// Check if the status code indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Check if the status code indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Check if the status code indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }

    /// Canonical short status text for the envelope's `status` field.
    pub fn status_text(&self) -> &'static str {
        match self.0 {
            200 => "ok",
            204 => "no_content",
            400 => "bad_request",
            404 => "not_found",
            405 => "method_not_allowed",
            500 => "internal_error",
            503 => "server_overload",
            _ => "unknown",
        }
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

/// The uniform JSON payload written for every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Builder for endpoint responses.
///
/// Handlers return one of these; the dispatcher turns it into the wire
/// envelope. Constructed once per request and written exactly once.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    status: StatusCode,
    description: Option<String>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    gzip: bool,
}

impl ResponseBuilder {
    /// Create a builder with the default 200 status and no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// 200 response carrying `body`.
    pub fn ok<T: Serialize>(body: T) -> Self {
        Self::new().status(StatusCode::OK).body(body)
    }

    /// 204 response with a description.
    pub fn no_content(desc: impl Into<String>) -> Self {
        Self::with_description(StatusCode::NO_CONTENT, desc)
    }

    /// 400 response with a description.
    pub fn bad_request(desc: impl Into<String>) -> Self {
        Self::with_description(StatusCode::BAD_REQUEST, desc)
    }

    /// 404 response with a description.
    pub fn not_found(desc: impl Into<String>) -> Self {
        Self::with_description(StatusCode::NOT_FOUND, desc)
    }

    /// 405 response with a description.
    pub fn method_not_allowed(desc: impl Into<String>) -> Self {
        Self::with_description(StatusCode::METHOD_NOT_ALLOWED, desc)
    }

    /// 500 response with a description.
    pub fn internal_error(desc: impl Into<String>) -> Self {
        Self::with_description(StatusCode::INTERNAL_SERVER_ERROR, desc)
    }

    /// 503 response with a description.
    pub fn server_overload(desc: impl Into<String>) -> Self {
        Self::with_description(StatusCode::SERVICE_UNAVAILABLE, desc)
    }

    fn with_description(status: StatusCode, desc: impl Into<String>) -> Self {
        Self::new().status(status).description(desc)
    }

    /// Set the status code.
    pub fn status(mut self, status: impl Into<StatusCode>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the envelope body.
    ///
    /// The value is converted to JSON here. A value that cannot be
    /// represented as JSON (e.g. a map with non-string keys) degrades the
    /// whole response to a 500 envelope naming the failure, so a broken
    /// serialization never goes out looking like a success.
    pub fn body<T: Serialize>(mut self, body: T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.body = Some(value);
                self
            }
            Err(err) => {
                tracing::error!("Failed to serialize response body: {}", err);
                Self::internal_error(format!("response serialization failed: {}", err))
            }
        }
    }

    /// Add an extra response header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Request gzip encoding for this response only.
    pub fn gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    /// The status code this builder will write.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Extra headers to apply when writing.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Whether this response asked for gzip encoding.
    pub fn wants_gzip(&self) -> bool {
        self.gzip
    }

    /// Produce the wire envelope.
    pub fn into_envelope(self) -> Envelope {
        Envelope {
            status_code: self.status.0,
            status: self.status.status_text().to_string(),
            description: self.description,
            body: self.body,
        }
    }
}
