//! Configuration Loader
//!
//! Layers the relay configuration from built-in defaults, JSON files and the
//! process environment.

use crate::config::settings::{MissingStatusPolicy, RelayConfig};
use crate::error::{RelayError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Comma-separated caller API keys
pub const ENV_API_KEYS: &str = "MY_KEYS";
/// Comma-separated upstream URLs, positional to the route list
pub const ENV_ENDPOINTS: &str = "ENDPOINTS";
/// Credential sent to upstreams
pub const ENV_UPSTREAM_SECRET: &str = "KASTG_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_TIMEOUT: &str = "UPSTREAM_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "UPSTREAM_CONNECT_TIMEOUT_SECS";
pub const ENV_MAX_BODY: &str = "UPSTREAM_MAX_BODY_BYTES";
pub const ENV_MISSING_STATUS: &str = "MISSING_STATUS_POLICY";
pub const ENV_INFO_TEXT: &str = "INFO_TEXT";
/// Explicit path to a JSON config file
pub const ENV_CONFIG_PATH: &str = "RELAYGATE_CONFIG";

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    document: Value,
}

impl ConfigLoader {
    /// Create a new config loader and load from default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self::builtin()?;
        loader.load_from_default_paths()?;
        Ok(loader)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self::builtin()?;
        loader.load_from_file(path)?;
        Ok(loader)
    }

    /// Create a loader holding only the built-in defaults
    pub fn builtin() -> Result<Self> {
        let mut loader = Self {
            document: Value::Object(Default::default()),
        };
        loader.load_builtin_defaults()?;
        Ok(loader)
    }

    /// Load built-in defaults
    fn load_builtin_defaults(&mut self) -> Result<()> {
        let defaults = include_str!("../../relay.json");
        let document: Value = serde_json::from_str(defaults).map_err(|e| {
            RelayError::Config(format!("Failed to parse built-in relay.json: {}", e))
        })?;

        self.merge_document(document);
        Ok(())
    }

    /// Load configuration from default paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Get list of config paths to check, lowest precedence first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("relaygate").join("config.json"));
        }

        paths.push(PathBuf::from("relaygate.json"));

        if let Ok(custom_path) = std::env::var(ENV_CONFIG_PATH) {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let document: Value = serde_json::from_str(&content).map_err(|e| {
            RelayError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if !document.is_object() {
            return Err(RelayError::Config(format!(
                "{} must contain a JSON object",
                path.display()
            )));
        }

        tracing::debug!(path = %path.display(), "loaded config file");
        self.merge_document(document);
        Ok(())
    }

    /// Merge another document into this one (later documents override earlier)
    fn merge_document(&mut self, other: Value) {
        merge_json(&mut self.document, other);
    }

    /// Build the configuration without consulting the environment
    pub fn into_config(self) -> Result<RelayConfig> {
        serde_json::from_value(self.document)
            .map_err(|e| RelayError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Build the configuration with process environment overrides
    pub fn with_env(self) -> Result<RelayConfig> {
        self.with_env_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration with overrides taken from `lookup`
    pub fn with_env_vars<F>(self, lookup: F) -> Result<RelayConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.into_config()?;

        if let Some(raw) = lookup(ENV_API_KEYS) {
            config.api_keys = split_list(&raw).filter(|k| !k.is_empty()).collect();
        }

        if let Some(raw) = lookup(ENV_ENDPOINTS) {
            // Blank items are dropped before positional matching, so later
            // endpoints move up one route
            config.endpoints = split_list(&raw).filter(|e| !e.is_empty()).collect();
        }

        if let Some(secret) = lookup(ENV_UPSTREAM_SECRET) {
            let secret = secret.trim().to_string();
            config.upstream_secret = (!secret.is_empty()).then_some(secret);
        }

        if let Some(raw) = lookup(ENV_PORT) {
            config.server.port = parse_env(ENV_PORT, &raw)?;
        }

        if let Some(host) = lookup(ENV_HOST) {
            config.server.host = host.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            config.upstream.timeout_secs = parse_env(ENV_TIMEOUT, &raw)?;
        }

        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT) {
            config.upstream.connect_timeout_secs = parse_env(ENV_CONNECT_TIMEOUT, &raw)?;
        }

        if let Some(raw) = lookup(ENV_MAX_BODY) {
            config.upstream.max_body_bytes = parse_env(ENV_MAX_BODY, &raw)?;
        }

        if let Some(raw) = lookup(ENV_MISSING_STATUS) {
            config.missing_status = MissingStatusPolicy::from_str(&raw)?;
        }

        if let Some(text) = lookup(ENV_INFO_TEXT) {
            config.info_text = text;
        }

        Ok(config)
    }
}

/// Split a comma-separated list, trimming each item
fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(|item| item.trim().to_string())
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| RelayError::Config(format!("{} has an invalid value '{}'", name, raw)))
}

/// Recursively merge `overlay` into `base`; objects merge key by key,
/// everything else is replaced
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::EndpointTable;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_load_builtin_defaults() {
        let config = ConfigLoader::builtin().unwrap().into_config().unwrap();
        assert_eq!(config.routes.len(), 13);
        assert_eq!(config.routes[0], "gpt4");
        assert_eq!(config.routes[12], "image-stable");
        assert_eq!(config.busy_phrases.len(), 2);
        assert_eq!(config.missing_status, MissingStatusPolicy::RequireResponse);
        assert_eq!(config.server.port, 3000);
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn test_load_from_custom_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "routes": ["alpha", "beta"],
                "server": {{ "port": 9000 }},
                "upstream": {{ "timeout_secs": 30 }}
            }}"#
        )
        .unwrap();

        let config = ConfigLoader::from_path(file.path())
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.routes, vec!["alpha", "beta"]);
        assert_eq!(config.server.port, 9000);
        // Untouched nested fields keep their built-in values
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.upstream.connect_timeout_secs, 10);
        assert_eq!(config.busy_phrases.len(), 2);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[1, 2, 3]").unwrap();
        assert!(matches!(
            ConfigLoader::from_path(file.path()),
            Err(RelayError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::builtin()
            .unwrap()
            .with_env_vars(env(&[
                (ENV_API_KEYS, " k1, ,k2 ,"),
                (ENV_ENDPOINTS, "http://a.test, ,http://c.test"),
                (ENV_UPSTREAM_SECRET, "s3cret"),
                (ENV_PORT, "8081"),
                (ENV_TIMEOUT, "45"),
                (ENV_MAX_BODY, "4096"),
                (ENV_MISSING_STATUS, "reject"),
            ]))
            .unwrap();

        assert_eq!(config.api_keys, vec!["k1", "k2"]);
        assert_eq!(config.endpoints, vec!["http://a.test", "http://c.test"]);
        assert_eq!(config.upstream_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.upstream.timeout_secs, 45);
        assert_eq!(config.upstream.max_body_bytes, 4096);
        assert_eq!(config.missing_status, MissingStatusPolicy::Reject);
    }

    #[test]
    fn test_blank_endpoints_shift_later_routes() {
        let config = ConfigLoader::builtin()
            .unwrap()
            .with_env_vars(env(&[(ENV_ENDPOINTS, "http://a.test,,http://c.test")]))
            .unwrap();

        let table = EndpointTable::from_positional(
            config.routes.as_slice(),
            config.endpoints.as_slice(),
        )
        .unwrap();
        assert_eq!(table.get("gpt4").unwrap().as_str(), "http://a.test/");
        assert_eq!(table.get("cohere").unwrap().as_str(), "http://c.test/");
        assert!(!table.contains("llama"));
    }

    #[test]
    fn test_blank_secret_is_absent() {
        let config = ConfigLoader::builtin()
            .unwrap()
            .with_env_vars(env(&[(ENV_UPSTREAM_SECRET, "   ")]))
            .unwrap();
        assert!(config.upstream_secret.is_none());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = ConfigLoader::builtin()
            .unwrap()
            .with_env_vars(env(&[(ENV_PORT, "eighty")]));
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[test]
    fn test_merge_json() {
        let mut base = serde_json::json!({"a": 1, "nested": {"x": 1, "y": 2}, "list": [1, 2]});
        merge_json(
            &mut base,
            serde_json::json!({"nested": {"y": 3}, "list": [9], "b": true}),
        );
        assert_eq!(
            base,
            serde_json::json!({"a": 1, "nested": {"x": 1, "y": 3}, "list": [9], "b": true})
        );
    }
}
