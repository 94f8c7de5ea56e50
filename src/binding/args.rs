//! Bound-arguments context.
//!
//! [`Args`] carries the three disjoint argument sources of a request — path
//! parameters in router match order, the raw query string, and (for
//! body-bearing methods) the collected JSON body — and hands them out as
//! typed values. Each endpoint's handler performs its own binding by calling
//! the accessors in declaration order:
//!
//! ```rust
//! use tinyrest::binding::{Args, BindResult};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Filter {
//!     name: Option<String>,
//! }
//!
//! fn bind(mut args: Args) -> BindResult<(i64, String, Filter)> {
//!     let id: i64 = args.path_param()?;
//!     let slug: String = args.path_param()?;
//!     let filter: Filter = args.filter()?;
//!     Ok((id, slug, filter))
//! }
//! ```
//!
//! The accessor cursor walks path values in the order the router reports
//! them, one value per call, so the positional matching of path segments to
//! handler parameters is explicit in the handler body. Query filters occupy a
//! single dedicated slot per request: the first [`Args::filter`] call decodes
//! the whole query string, later calls get the type's default value.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A failure while binding request data to handler arguments.
///
/// Every variant is terminal for its request: the dispatcher answers with a
/// 400 envelope carrying the error's display text and the rest of the
/// handler never runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A path value could not be parsed as a decimal integer.
    #[error("{name} is not type int")]
    NotInt { name: String },

    /// A path value could not be parsed as a float.
    #[error("{name} is not type float64")]
    NotFloat { name: String },

    /// The handler asked for more path values than the route supplied.
    /// Deliberate hard failure; a route template and its handler must agree.
    #[error("no path parameter left for position {position}")]
    MissingPathValue { position: usize },

    /// The query string did not decode into the filter type.
    #[error("{0}")]
    Query(String),

    /// The request body did not decode into the body type. Carries the
    /// decoder's message verbatim.
    #[error("{0}")]
    Body(String),

    /// A body was requested but the request carried none.
    #[error("request has no body")]
    NoBody,
}

/// A scalar that can be produced from one path segment.
///
/// `name` is the `:name` capture the router matched the segment under; it
/// appears in the error text so a client sees which parameter was mistyped.
pub trait FromSegment: Sized {
    fn from_segment(name: &str, value: &str) -> Result<Self, BindError>;
}

impl FromSegment for String {
    /// A string slot accepts any segment literally; this never fails.
    fn from_segment(_name: &str, value: &str) -> Result<Self, BindError> {
        Ok(value.to_string())
    }
}

impl FromSegment for i64 {
    fn from_segment(name: &str, value: &str) -> Result<Self, BindError> {
        value.parse().map_err(|_| BindError::NotInt {
            name: name.to_string(),
        })
    }
}

impl FromSegment for f64 {
    fn from_segment(name: &str, value: &str) -> Result<Self, BindError> {
        value.parse().map_err(|_| BindError::NotFloat {
            name: name.to_string(),
        })
    }
}

/// Optional scalar slot: the same conversion rules, wrapped in `Some`.
/// A mistyped value still fails binding; optionality is about the handler's
/// signature, not about forgiving bad input.
impl<T: FromSegment> FromSegment for Option<T> {
    fn from_segment(name: &str, value: &str) -> Result<Self, BindError> {
        T::from_segment(name, value).map(Some)
    }
}

/// Typed argument sources for one request.
///
/// Built by the dispatcher, consumed by the endpoint's handler. The body is
/// present only for body-bearing methods and can be taken once.
#[derive(Debug, Default)]
pub struct Args {
    path: Vec<(String, String)>,
    cursor: usize,
    query: String,
    filter_taken: bool,
    body: Option<Bytes>,
}

impl Args {
    /// Build a context from router-reported path parameters (in match
    /// order), the raw query string, and the collected body, if any.
    pub fn new(
        path: Vec<(String, String)>,
        query: impl Into<String>,
        body: Option<Bytes>,
    ) -> Self {
        Self {
            path,
            cursor: 0,
            query: query.into(),
            filter_taken: false,
            body,
        }
    }

    /// Bind the next path parameter.
    ///
    /// Advances the cursor by one scalar slot. Asking for a value the route
    /// did not capture is a hard binding failure. Values the handler never
    /// asks for are ignored.
    pub fn path_param<T: FromSegment>(&mut self) -> Result<T, BindError> {
        let (name, value) = self.path.get(self.cursor).ok_or(BindError::MissingPathValue {
            position: self.cursor,
        })?;
        let bound = T::from_segment(name, value)?;
        self.cursor += 1;
        Ok(bound)
    }

    /// Bind the single query-filter slot.
    ///
    /// The first call decodes the full query string into `T`; at most one
    /// filter is bound per request, so every later call yields
    /// `T::default()` rather than an error.
    pub fn filter<T: DeserializeOwned + Default>(&mut self) -> Result<T, BindError> {
        if self.filter_taken {
            return Ok(T::default());
        }
        self.filter_taken = true;
        serde_urlencoded::from_str(&self.query).map_err(|e| BindError::Query(e.to_string()))
    }

    /// Bind the JSON request body.
    ///
    /// The body is consumed; a second call (or any call on a no-body method)
    /// fails with [`BindError::NoBody`]. A decode failure carries the
    /// decoder's message verbatim.
    pub fn body<T: DeserializeOwned>(&mut self) -> Result<T, BindError> {
        let body = self.body.take().ok_or(BindError::NoBody)?;
        serde_json::from_slice(&body).map_err(|e| BindError::Body(e.to_string()))
    }

    /// The raw query string, as received.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Path parameters not yet consumed by [`Args::path_param`].
    pub fn remaining_path_params(&self) -> usize {
        self.path.len().saturating_sub(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn path(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_string_segment_is_literal() {
        let mut args = Args::new(path(&[("name", "anything at all")]), "", None);
        let bound: String = args.path_param().unwrap();
        assert_eq!(bound, "anything at all");
    }

    #[test]
    fn test_int_segment_parses() {
        let mut args = Args::new(path(&[("id", "42")]), "", None);
        let bound: i64 = args.path_param().unwrap();
        assert_eq!(bound, 42);
    }

    #[test]
    fn test_int_segment_failure_names_parameter() {
        let mut args = Args::new(path(&[("id", "abc")]), "", None);
        let err = args.path_param::<i64>().unwrap_err();
        assert_eq!(err.to_string(), "id is not type int");
    }

    #[test]
    fn test_float_segment_parses() {
        let mut args = Args::new(path(&[("uuid", "3.25")]), "", None);
        let bound: f64 = args.path_param().unwrap();
        assert_eq!(bound, 3.25);
    }

    #[test]
    fn test_float_segment_failure_names_parameter() {
        let mut args = Args::new(path(&[("uuid", "x")]), "", None);
        let err = args.path_param::<f64>().unwrap_err();
        assert_eq!(err.to_string(), "uuid is not type float64");
    }

    #[test]
    fn test_optional_scalar_binds_as_some() {
        let mut args = Args::new(path(&[("name", "franklin")]), "", None);
        let bound: Option<String> = args.path_param().unwrap();
        assert_eq!(bound.as_deref(), Some("franklin"));
    }

    #[test]
    fn test_optional_scalar_still_type_checks() {
        let mut args = Args::new(path(&[("id", "nope")]), "", None);
        let err = args.path_param::<Option<i64>>().unwrap_err();
        assert_eq!(err.to_string(), "id is not type int");
    }

    #[test]
    fn test_cursor_walks_in_router_order() {
        let mut args = Args::new(path(&[("id", "7"), ("name", "a"), ("uuid", "1.5")]), "", None);
        assert_eq!(args.path_param::<i64>().unwrap(), 7);
        assert_eq!(args.path_param::<String>().unwrap(), "a");
        assert_eq!(args.path_param::<f64>().unwrap(), 1.5);
        assert_eq!(args.remaining_path_params(), 0);
    }

    #[test]
    fn test_failed_bind_does_not_advance_cursor() {
        let mut args = Args::new(path(&[("id", "abc")]), "", None);
        assert!(args.path_param::<i64>().is_err());
        // The value is still there; a string slot can take it.
        assert_eq!(args.path_param::<String>().unwrap(), "abc");
    }

    #[test]
    fn test_overrun_is_hard_failure() {
        let mut args = Args::new(path(&[("id", "1")]), "", None);
        args.path_param::<i64>().unwrap();
        let err = args.path_param::<String>().unwrap_err();
        assert_eq!(err, BindError::MissingPathValue { position: 1 });
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Filter {
        name: Option<String>,
        age: Option<u32>,
    }

    #[test]
    fn test_filter_decodes_query_string() {
        let mut args = Args::new(Vec::new(), "name=X&age=20", None);
        let filter: Filter = args.filter().unwrap();
        assert_eq!(filter.name.as_deref(), Some("X"));
        assert_eq!(filter.age, Some(20));
    }

    #[test]
    fn test_filter_keys_match_case_sensitively() {
        let mut args = Args::new(Vec::new(), "Name=X", None);
        let filter: Filter = args.filter().unwrap();
        assert_eq!(filter.name, None);
    }

    #[test]
    fn test_second_filter_slot_gets_default() {
        let mut args = Args::new(Vec::new(), "name=X", None);
        let first: Filter = args.filter().unwrap();
        let second: Filter = args.filter().unwrap();
        assert_eq!(first.name.as_deref(), Some("X"));
        assert_eq!(second, Filter::default());
    }

    #[test]
    fn test_filter_decode_failure_carries_message() {
        #[derive(Debug, Default, Deserialize)]
        struct Strict {
            #[allow(dead_code)]
            age: u32,
        }
        let mut args = Args::new(Vec::new(), "age=abc", None);
        let err = args.filter::<Strict>().unwrap_err();
        assert!(matches!(err, BindError::Query(_)));
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Person {
        name: String,
    }

    #[test]
    fn test_body_decodes_json() {
        let mut args = Args::new(Vec::new(), "", Some(Bytes::from(r#"{"name":"A"}"#)));
        let person: Person = args.body().unwrap();
        assert_eq!(person.name, "A");
    }

    #[test]
    fn test_body_is_read_once() {
        let mut args = Args::new(Vec::new(), "", Some(Bytes::from(r#"{"name":"A"}"#)));
        let _: Person = args.body().unwrap();
        assert_eq!(args.body::<Person>().unwrap_err(), BindError::NoBody);
    }

    #[test]
    fn test_body_on_bodyless_request_fails() {
        let mut args = Args::new(Vec::new(), "", None);
        assert_eq!(args.body::<Person>().unwrap_err(), BindError::NoBody);
    }

    #[test]
    fn test_malformed_body_carries_decoder_message() {
        let raw = r#"{"name":"#;
        let mut args = Args::new(Vec::new(), "", Some(Bytes::from(raw)));
        let err = args.body::<Person>().unwrap_err();
        let expected = serde_json::from_str::<Person>(raw).unwrap_err().to_string();
        assert_eq!(err.to_string(), expected);
    }
}
