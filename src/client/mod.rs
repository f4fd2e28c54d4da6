//! Client Module
//!
//! Upstream HTTP client and transport error classification.

pub mod http;
pub mod transport;

pub use http::UpstreamClient;
pub use transport::{TransportError, TransportErrorKind};
