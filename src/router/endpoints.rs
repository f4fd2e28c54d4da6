//! Endpoint Table
//!
//! Maps route names to upstream base URLs.

use crate::error::{RelayError, Result};
use reqwest::Url;

/// A single route and its upstream, if configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path segment callers use (e.g., "gpt4")
    pub name: String,

    /// Upstream base URL; `None` when the slot is empty
    pub endpoint: Option<Url>,
}

/// Immutable ordered route table
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    routes: Vec<Route>,
}

impl EndpointTable {
    /// Pair route names with endpoints by position.
    ///
    /// Missing or blank endpoint slots leave the route absent. Endpoints
    /// beyond the last route name are ignored.
    pub fn from_positional<N, E>(names: &[N], endpoints: &[E]) -> Result<Self>
    where
        N: AsRef<str>,
        E: AsRef<str>,
    {
        if endpoints.len() > names.len() {
            tracing::warn!(
                routes = names.len(),
                endpoints = endpoints.len(),
                "more endpoints than routes, extra endpoints ignored"
            );
        }

        let mut routes: Vec<Route> = Vec::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(RelayError::Config(format!("Route name #{} is blank", idx)));
            }
            if routes.iter().any(|r| r.name == name) {
                return Err(RelayError::Config(format!("Duplicate route name '{}'", name)));
            }

            let endpoint = match endpoints.get(idx).map(|e| e.as_ref().trim()) {
                Some(raw) if !raw.is_empty() => Some(Url::parse(raw).map_err(|e| {
                    RelayError::Config(format!("Invalid endpoint for route '{}': {}", name, e))
                })?),
                _ => None,
            };

            routes.push(Route {
                name: name.to_string(),
                endpoint,
            });
        }

        Ok(Self { routes })
    }

    /// Upstream URL for a route, if the route exists and has one
    pub fn get(&self, name: &str) -> Option<&Url> {
        self.routes
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.endpoint.as_ref())
    }

    /// Whether the route is known and configured
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of routes that have an upstream
    pub fn active_routes(&self) -> impl Iterator<Item = &str> {
        self.routes
            .iter()
            .filter(|r| r.endpoint.is_some())
            .map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
