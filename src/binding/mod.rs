//! Request binding: turning raw HTTP request data into typed handler
//! arguments, and the handler/middleware abstractions consuming them.

pub mod args;
pub mod handler;

pub use args::{Args, BindError, FromSegment};
pub use handler::{BindResult, DynHandler, Handler, HandlerChain, HandlerFn, Middleware};
