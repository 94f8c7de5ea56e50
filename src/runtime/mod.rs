//! Runtime: configuration, the router adapter and the HTTP server.

mod config;
mod router;
mod server;

pub use config::AppConfig;
pub use router::{RouteEntry, RouteError, Router};
pub use server::App;
