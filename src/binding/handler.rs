//! Handler trait and middleware chain.
//!
//! A handler takes the bound-arguments context and produces a response
//! builder. Returning exactly one envelope per request is a property of the
//! signature rather than a runtime contract to police.

use crate::binding::args::{Args, BindError};
use crate::http::ResponseBuilder;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Result of binding and running an endpoint handler.
pub type BindResult<T> = Result<T, BindError>;

/// An endpoint handler.
///
/// Implementations bind their arguments from [`Args`] (propagating binding
/// failures with `?`) and return the response to write.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, args: Args) -> BindResult<ResponseBuilder>;
}

/// Shared handler reference, as stored in endpoint tables and route entries.
pub type DynHandler = Arc<dyn Handler>;

/// Adapter turning a plain async function or closure into a [`Handler`].
///
/// ```rust
/// use tinyrest::binding::{Args, BindResult, HandlerFn};
/// use tinyrest::http::ResponseBuilder;
///
/// let handler = HandlerFn::new(|mut args: Args| async move {
///     let id: i64 = args.path_param()?;
///     BindResult::Ok(ResponseBuilder::ok(serde_json::json!({ "id": id })))
/// });
/// # let _ = handler;
/// ```
pub struct HandlerFn<F>(F);

impl<F> HandlerFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = BindResult<ResponseBuilder>> + Send + 'static,
{
    async fn handle(&self, args: Args) -> BindResult<ResponseBuilder> {
        (self.0)(args).await
    }
}

/// A handler-transforming function. Middleware receives the next handler and
/// returns the wrapped one.
pub type Middleware = Arc<dyn Fn(DynHandler) -> DynHandler + Send + Sync>;

/// Ordered middleware chain for one endpoint table.
///
/// Composition is outermost-first: the first middleware pushed wraps last,
/// so it runs first on the way in and last on the way out.
#[derive(Clone, Default)]
pub struct HandlerChain {
    layers: Vec<Middleware>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware to the chain.
    pub fn push(&mut self, middleware: Middleware) {
        self.layers.push(middleware);
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Wrap `handler` with every layer. Applied in reverse push order so the
    /// first-pushed layer ends up outermost.
    pub fn wrap(&self, mut handler: DynHandler) -> DynHandler {
        for layer in self.layers.iter().rev() {
            handler = layer(handler);
        }
        handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Probe {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Handler for Probe {
        async fn handle(&self, _args: Args) -> BindResult<ResponseBuilder> {
            self.log.lock().unwrap().push("handler".to_string());
            Ok(ResponseBuilder::ok(serde_json::json!("done")))
        }
    }

    struct Layer {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        next: DynHandler,
    }

    #[async_trait]
    impl Handler for Layer {
        async fn handle(&self, args: Args) -> BindResult<ResponseBuilder> {
            self.log.lock().unwrap().push(format!("{}-pre", self.tag));
            let resp = self.next.handle(args).await;
            self.log.lock().unwrap().push(format!("{}-post", self.tag));
            resp
        }
    }

    fn layer(tag: &'static str, log: Arc<Mutex<Vec<String>>>) -> Middleware {
        Arc::new(move |next: DynHandler| {
            Arc::new(Layer {
                tag,
                log: log.clone(),
                next,
            }) as DynHandler
        })
    }

    #[tokio::test]
    async fn test_first_pushed_middleware_runs_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = HandlerChain::new();
        chain.push(layer("m1", log.clone()));
        chain.push(layer("m2", log.clone()));

        let terminal: DynHandler = Arc::new(Probe { log: log.clone() });
        let wrapped = chain.wrap(terminal);
        wrapped.handle(Args::default()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["m1-pre", "m2-pre", "handler", "m2-post", "m1-post"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_empty_chain_is_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = HandlerChain::new();
        let wrapped = chain.wrap(Arc::new(Probe { log: log.clone() }));
        wrapped.handle(Args::default()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["handler".to_string()]);
    }

    #[tokio::test]
    async fn test_handler_fn_binds_and_answers() {
        let handler = HandlerFn::new(|mut args: Args| async move {
            let id: i64 = args.path_param()?;
            BindResult::Ok(ResponseBuilder::ok(serde_json::json!({ "id": id })))
        });
        let args = Args::new(vec![("id".to_string(), "42".to_string())], "", None);
        let envelope = handler.handle(args).await.unwrap().into_envelope();
        assert_eq!(envelope.body, Some(serde_json::json!({"id": 42})));
    }
}
