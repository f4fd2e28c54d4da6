//! Request Validation
//!
//! Gate run before any upstream call. Checks happen in a fixed order:
//! route, then prompt, then key.

use crate::error::{RelayError, Result};
use crate::router::endpoints::EndpointTable;
use crate::router::keys::KeyRegistry;
use reqwest::Url;

/// Validate an inbound request and resolve its upstream URL
pub fn validate<'t>(
    endpoints: &'t EndpointTable,
    keys: &KeyRegistry,
    model: &str,
    prompt: Option<&str>,
    key: Option<&str>,
) -> Result<&'t Url> {
    let endpoint = endpoints
        .get(model)
        .ok_or_else(|| RelayError::UnknownRoute(model.to_string()))?;

    if prompt.map_or(true, str::is_empty) {
        return Err(RelayError::MissingPrompt);
    }

    match key {
        Some(key) if keys.contains(key) => Ok(endpoint),
        _ => Err(RelayError::InvalidKey),
    }
}
