//! Configuration Module
//!
//! Handles relay configuration loading and validation.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{MissingStatusPolicy, RelayConfig, ServerConfig, UpstreamConfig};
