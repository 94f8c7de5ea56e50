//! Router adapter.
//!
//! Longest-prefix path matching is delegated to `matchit`, one radix tree
//! per HTTP method. This adapter owns the two-call contract the dispatcher
//! relies on: `register(method, template, entry)` at setup time,
//! `dispatch(method, path)` per request, returning the entry plus the path
//! parameters in match order.
//!
//! Templates use `:name` segment captures (`/user/:id/:name`); they are
//! rewritten to matchit's `{name}` syntax on registration.

use crate::binding::DynHandler;
use crate::http::Method;
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::fmt;

/// What the dispatcher needs per matched route: the middleware-wrapped
/// handler and the effective gzip flag.
#[derive(Clone)]
pub struct RouteEntry {
    pub handler: DynHandler,
    pub gzip: bool,
}

impl fmt::Debug for RouteEntry {
    // The handler is an opaque trait object; show the flag only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("gzip", &self.gzip)
            .finish_non_exhaustive()
    }
}

/// A dispatch miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// No template matched the path under any method.
    NotFound,
    /// The path exists, but not under the requested method.
    MethodNotAllowed,
}

/// Route table: one matchit tree per method.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<RouteEntry>>,
    count: usize,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// A malformed or conflicting template is a configuration error;
    /// registration happens during single-threaded setup, so it panics
    /// rather than limping into serving with a missing route.
    pub fn register(&mut self, method: Method, template: &str, entry: RouteEntry) {
        let converted = convert_template(template);
        self.routes
            .entry(method)
            .or_default()
            .insert(&converted, entry)
            .unwrap_or_else(|e| panic!("invalid route `{template}`: {e}"));
        self.count += 1;
    }

    /// Match `path` under `method`.
    ///
    /// Returns the route entry and the `(name, value)` path parameters in
    /// the order they appear in the template.
    pub fn dispatch(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(RouteEntry, Vec<(String, String)>), RouteError> {
        let path = normalize(path);
        if let Some(tree) = self.routes.get(&method) {
            if let Ok(matched) = tree.at(path) {
                let params = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                return Ok((matched.value.clone(), params));
            }
        }

        // Distinguish a wrong method on a known path from a missing path.
        for (other, tree) in &self.routes {
            if *other != method && tree.at(path).is_ok() {
                return Err(RouteError::MethodNotAllowed);
            }
        }
        Err(RouteError::NotFound)
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Rewrite `:name` captures to matchit's `{name}` syntax.
fn convert_template(template: &str) -> String {
    let converted = template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");
    normalize(&converted).to_string()
}

/// Trailing-slash normalization so `base_path + "/"` and `"/base"` land on
/// the same route.
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
