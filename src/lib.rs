//! # tinyrest - Lightweight Controller/Service REST Framework
//!
//! tinyrest maps registered controller objects to HTTP endpoints, binds path
//! parameters, query strings and JSON bodies into typed handler arguments,
//! runs a middleware chain, and serializes every result as a uniform JSON
//! envelope. A small type-keyed service registry provides singleton
//! dependencies shared across controllers.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                               App                                  │
//! │  ┌──────────────────┐   ┌─────────────────────────────────────┐   │
//! │  │ Service Registry │   │              Router                 │   │
//! │  │  (singletons,    │   │  method + path ──▶ middleware chain │   │
//! │  │   init once)     │   │                    ──▶ handler      │   │
//! │  └──────────────────┘   └─────────────────────────────────────┘   │
//! └────────────────────────────────────────────────────────────────────┘
//!          ▲                                  ▲
//!   install / resolve              controller endpoint tables
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tinyrest::prelude::*;
//!
//! struct UserService {
//!     greeting: String,
//! }
//!
//! impl Service for UserService {
//!     fn init(&mut self) -> Result<(), ServiceError> {
//!         self.greeting = "hello".to_string();
//!         Ok(())
//!     }
//! }
//!
//! struct UserController {
//!     users: Arc<UserService>,
//! }
//!
//! impl Controller for UserController {
//!     fn endpoints(self: Arc<Self>) -> Endpoints {
//!         let mut endpoints = Endpoints::new();
//!         endpoints.base_path("/user");
//!         let users = self.users.clone();
//!         endpoints.get("/:id", move |mut args| {
//!             let users = users.clone();
//!             async move {
//!                 let id: i64 = args.path_param()?;
//!                 Ok(ResponseBuilder::ok(serde_json::json!({
//!                     "id": id,
//!                     "greeting": users.greeting,
//!                 })))
//!             }
//!         });
//!         endpoints
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut app = App::new(AppConfig::new().port(8080));
//!
//!     let users = app.services().install(UserService {
//!         greeting: String::new(),
//!     })?;
//!     app.controller(Arc::new(UserController { users }));
//!
//!     app.run().await
//! }
//! ```
//!
//! ## Request binding
//!
//! Handlers pull typed values out of an [`binding::Args`] context:
//! [`binding::Args::path_param`] consumes path captures in router match
//! order, [`binding::Args::filter`] decodes the query string into a single
//! filter struct, and [`binding::Args::body`] decodes the JSON body on
//! POST/PUT/PATCH. Any binding failure short-circuits into a 400 envelope
//! naming the offending parameter; the handler body past the failed bind
//! never runs.

pub mod binding;
pub mod controller;
pub mod http;
pub mod runtime;
pub mod service;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::binding::{Args, BindError, BindResult, Handler, HandlerFn, Middleware};
    pub use crate::controller::{Controller, Endpoints};
    pub use crate::http::{Envelope, Method, ResponseBuilder, StatusCode};
    pub use crate::runtime::{App, AppConfig};
    pub use crate::service::{Service, ServiceError, ServiceRegistry};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use binding::{Args, BindError, Handler};
pub use controller::{Controller, Endpoints};
pub use http::{Envelope, Method, ResponseBuilder};
pub use runtime::{App, AppConfig};
pub use service::{Service, ServiceError, ServiceRegistry};
