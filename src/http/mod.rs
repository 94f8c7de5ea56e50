//! HTTP surface types: methods and the uniform response envelope.

mod method;
mod response;

pub use method::{Method, UnsupportedMethod};
pub use response::{Envelope, ResponseBuilder, StatusCode};
