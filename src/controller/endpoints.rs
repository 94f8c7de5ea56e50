//! Per-controller endpoint table.

use crate::binding::{Args, BindResult, DynHandler, HandlerChain, HandlerFn, Middleware};
use crate::http::{Method, ResponseBuilder};
use std::future::Future;
use std::sync::Arc;

/// One registered route: method, path template, handler.
///
/// Immutable once added; owned exclusively by its table.
pub struct Endpoint {
    method: Method,
    path: String,
    handler: DynHandler,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path template relative to the table's base path, `:name` capture
    /// syntax.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> DynHandler {
        self.handler.clone()
    }
}

/// The set of routes, base path, middleware and gzip preference declared by
/// one controller.
///
/// Built inside [`Controller::endpoints`](crate::controller::Controller::endpoints)
/// and handed to the app, which registers every entry with the router.
#[derive(Default)]
pub struct Endpoints {
    base_path: String,
    endpoints: Vec<Endpoint>,
    middleware: HandlerChain,
    gzip: bool,
}

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base path prepended to every endpoint path in this table.
    pub fn base_path(&mut self, path: impl Into<String>) {
        self.base_path = path.into();
    }

    /// Add an endpoint under an explicit method.
    pub fn add<F, Fut>(&mut self, method: Method, path: impl Into<String>, callback: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BindResult<ResponseBuilder>> + Send + 'static,
    {
        self.add_handler(method, path, Arc::new(HandlerFn::new(callback)));
    }

    /// Add an endpoint backed by a prebuilt handler.
    pub fn add_handler(&mut self, method: Method, path: impl Into<String>, handler: DynHandler) {
        self.endpoints.push(Endpoint {
            method,
            path: path.into(),
            handler,
        });
    }

    /// Add an endpoint with method GET.
    pub fn get<F, Fut>(&mut self, path: impl Into<String>, callback: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BindResult<ResponseBuilder>> + Send + 'static,
    {
        self.add(Method::Get, path, callback);
    }

    /// Add an endpoint with method DELETE.
    pub fn delete<F, Fut>(&mut self, path: impl Into<String>, callback: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BindResult<ResponseBuilder>> + Send + 'static,
    {
        self.add(Method::Delete, path, callback);
    }

    /// Add an endpoint with method POST.
    pub fn post<F, Fut>(&mut self, path: impl Into<String>, callback: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BindResult<ResponseBuilder>> + Send + 'static,
    {
        self.add(Method::Post, path, callback);
    }

    /// Add an endpoint with method PUT.
    pub fn put<F, Fut>(&mut self, path: impl Into<String>, callback: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BindResult<ResponseBuilder>> + Send + 'static,
    {
        self.add(Method::Put, path, callback);
    }

    /// Add an endpoint with method PATCH.
    pub fn patch<F, Fut>(&mut self, path: impl Into<String>, callback: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BindResult<ResponseBuilder>> + Send + 'static,
    {
        self.add(Method::Patch, path, callback);
    }

    /// Append middleware to this table's chain. The first middleware
    /// registered executes outermost on every dispatch.
    pub fn middleware(&mut self, middleware: Middleware) {
        self.middleware.push(middleware);
    }

    /// Enable gzip encoding on every endpoint of this table.
    pub fn gzip(&mut self, gzip: bool) {
        self.gzip = gzip;
    }

    pub fn base(&self) -> &str {
        &self.base_path
    }

    pub fn gzip_enabled(&self) -> bool {
        self.gzip
    }

    pub fn chain(&self) -> &HandlerChain {
        &self.middleware
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> Endpoints {
        let mut endpoints = Endpoints::new();
        endpoints.base_path("/user");
        endpoints.get("/:id", |mut args: Args| async move {
            let id: i64 = args.path_param()?;
            Ok(ResponseBuilder::ok(json!({ "id": id })))
        });
        endpoints.post("/", |mut args: Args| async move {
            let body: serde_json::Value = args.body()?;
            Ok(ResponseBuilder::ok(body))
        });
        endpoints
    }

    #[test]
    fn test_table_keeps_declaration_order() {
        let endpoints = table();
        let declared: Vec<_> = endpoints
            .iter()
            .map(|e| (e.method(), e.path().to_string()))
            .collect();
        assert_eq!(
            declared,
            vec![
                (Method::Get, "/:id".to_string()),
                (Method::Post, "/".to_string())
            ]
        );
        assert_eq!(endpoints.base(), "/user");
    }

    #[tokio::test]
    async fn test_registered_handler_is_invocable() {
        let endpoints = table();
        let endpoint = endpoints.iter().next().unwrap();
        let args = Args::new(vec![("id".to_string(), "7".to_string())], "", None);
        let envelope = endpoint.handler().handle(args).await.unwrap().into_envelope();
        assert_eq!(envelope.body, Some(json!({"id": 7})));
    }

    #[test]
    fn test_gzip_flag_and_chain() {
        let mut endpoints = table();
        assert!(!endpoints.gzip_enabled());
        endpoints.gzip(true);
        assert!(endpoints.gzip_enabled());
        assert!(endpoints.chain().is_empty());
        endpoints.middleware(Arc::new(|next: crate::binding::DynHandler| next));
        assert_eq!(endpoints.chain().len(), 1);
    }
}
