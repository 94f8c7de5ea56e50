//! HTTP method enumeration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP method enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Whether requests under this method carry a JSON body.
    ///
    /// Body-bearing methods bind the request body into the handler's body
    /// slot; the others bind path and query parameters only.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verb outside the supported set (TRACE, CONNECT, extension methods).
///
/// The server answers these with a method-not-allowed envelope; they must
/// never be coerced onto a routable method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported method {0}")]
pub struct UnsupportedMethod(pub String);

impl TryFrom<&hyper::Method> for Method {
    type Error = UnsupportedMethod;

    fn try_from(method: &hyper::Method) -> Result<Self, Self::Error> {
        match *method {
            hyper::Method::GET => Ok(Method::Get),
            hyper::Method::POST => Ok(Method::Post),
            hyper::Method::PUT => Ok(Method::Put),
            hyper::Method::DELETE => Ok(Method::Delete),
            hyper::Method::PATCH => Ok(Method::Patch),
            hyper::Method::HEAD => Ok(Method::Head),
            hyper::Method::OPTIONS => Ok(Method::Options),
            _ => Err(UnsupportedMethod(method.as_str().to_string())),
        }
    }
}
