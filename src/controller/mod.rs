//! Controllers: objects declaring HTTP endpoints.

mod endpoints;

pub use endpoints::{Endpoint, Endpoints};

use std::sync::Arc;

/// A controller declares its endpoint table once, at registration time.
///
/// Service dependencies are injected through the controller's constructor as
/// shared [`Arc`]s resolved from the service registry; `endpoints` then
/// captures whatever the handlers need:
///
/// ```rust
/// use std::sync::Arc;
/// use tinyrest::controller::{Controller, Endpoints};
/// use tinyrest::http::ResponseBuilder;
///
/// struct UserController;
///
/// impl Controller for UserController {
///     fn endpoints(self: Arc<Self>) -> Endpoints {
///         let mut endpoints = Endpoints::new();
///         endpoints.base_path("/user");
///         endpoints.get("/:id", move |mut args| async move {
///             let id: i64 = args.path_param()?;
///             Ok(ResponseBuilder::ok(serde_json::json!({ "id": id })))
///         });
///         endpoints
///     }
/// }
/// ```
pub trait Controller: Send + Sync {
    /// Build the endpoint table for this controller. Called exactly once,
    /// during registration; the table is never mutated afterwards.
    fn endpoints(self: Arc<Self>) -> Endpoints;
}
