//! API Module
//!
//! Normalized response types and upstream response classification.

pub mod busy;
pub mod classifier;
pub mod response;

pub use busy::BusyPhrases;
pub use classifier::{extract_response, nested_failure_signal, BusyReason, Classifier};
pub use response::{NormalizedResult, ResponseItem};
