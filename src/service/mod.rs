//! Services: named singleton dependencies with an initialization lifecycle.

mod registry;

pub use registry::{Service, ServiceError, ServiceRegistry};
