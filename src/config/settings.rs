//! Relay Settings
//!
//! Defines the configuration schema for the relay.

use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Route names, in the same order as `endpoints`
    pub routes: Vec<String>,

    /// Upstream base URLs, positionally matched to `routes`.
    /// Blank entries leave their route absent; `ENDPOINTS` drops them instead.
    pub endpoints: Vec<String>,

    /// Caller API keys accepted by the relay
    pub api_keys: Vec<String>,

    /// Credential the relay presents to upstreams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_secret: Option<String>,

    /// Texts that mean "overloaded" rather than an answer
    pub busy_phrases: Vec<String>,

    /// How payloads without a top-level `status` are treated
    pub missing_status: MissingStatusPolicy,

    /// Body served on `GET /`
    pub info_text: String,

    /// Listener settings
    pub server: ServerConfig,

    /// Upstream HTTP client settings
    pub upstream: UpstreamConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Total time allowed for one upstream call
    pub timeout_secs: u64,

    /// Time allowed to establish the connection
    pub connect_timeout_secs: u64,

    /// Largest upstream body read before the call fails
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            connect_timeout_secs: 10,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Treatment of payloads that carry no top-level `status`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingStatusPolicy {
    /// Always busy
    Reject,

    /// Busy only when no response text can be extracted
    #[default]
    RequireResponse,

    /// Never busy on this ground
    Allow,
}

impl FromStr for MissingStatusPolicy {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(MissingStatusPolicy::Reject),
            "require_response" => Ok(MissingStatusPolicy::RequireResponse),
            "allow" => Ok(MissingStatusPolicy::Allow),
            other => Err(RelayError::Config(format!(
                "Unknown missing status policy '{}'. Expected reject, require_response or allow",
                other
            ))),
        }
    }
}
