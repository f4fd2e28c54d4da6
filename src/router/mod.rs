//! Router Module
//!
//! Route table, caller key registry and request validation.

pub mod endpoints;
pub mod keys;
pub mod validator;

pub use endpoints::EndpointTable;
pub use keys::KeyRegistry;
pub use validator::validate;
