//! relaygate - single-route AI relay
//!
//! Forwards prompts to one of several upstream inference endpoints, gates
//! callers with a static key allowlist, and normalizes every upstream answer
//! into one JSON shape.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod router;
pub mod server;

use api::{BusyPhrases, Classifier};
use client::UpstreamClient;
use config::RelayConfig;
use error::Result;
use router::{EndpointTable, KeyRegistry};

/// The relay: everything a request handler needs, immutable once built
#[derive(Debug, Clone)]
pub struct Relay {
    /// Route name -> upstream URL
    endpoints: EndpointTable,

    /// Accepted caller keys
    keys: KeyRegistry,

    /// Upstream response classifier
    classifier: Classifier,

    /// HTTP client for upstream calls
    upstream: UpstreamClient,

    /// Body for `GET /`
    info_text: String,
}

impl Relay {
    /// Create a relay from a config object
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let endpoints =
            EndpointTable::from_positional(config.routes.as_slice(), config.endpoints.as_slice())?;
        let keys = KeyRegistry::new(&config.api_keys);

        if keys.is_empty() {
            tracing::warn!("no API keys configured, every relay request will be rejected");
        }
        if config.upstream_secret.is_none() {
            tracing::warn!("no upstream secret configured, upstream calls carry an empty key");
        }
        if endpoints.active_routes().next().is_none() {
            tracing::warn!("no endpoints configured, every route redirects to /");
        }

        Ok(Self {
            endpoints,
            keys,
            classifier: Classifier::new(
                BusyPhrases::new(&config.busy_phrases),
                config.missing_status,
            ),
            upstream: UpstreamClient::new(&config.upstream, config.upstream_secret.clone())?,
            info_text: config.info_text.clone(),
        })
    }

    /// Validate, call the upstream, and classify its answer.
    ///
    /// Returns the answer text on success.
    pub async fn relay(
        &self,
        model: &str,
        prompt: Option<&str>,
        key: Option<&str>,
    ) -> Result<String> {
        let endpoint = match router::validate(&self.endpoints, &self.keys, model, prompt, key) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::debug!(route = model, error = %e, "request rejected");
                return Err(e);
            }
        };

        let outcome = self.upstream.fetch(endpoint, prompt.unwrap_or_default()).await;

        match self.classifier.classify(outcome) {
            Ok(text) => {
                tracing::info!(route = model, bytes = text.len(), "relayed response");
                Ok(text)
            }
            Err(e) if e.is_soft_failure() => {
                tracing::warn!(route = model, error = %e, "upstream soft failure");
                Err(e)
            }
            Err(e) => {
                tracing::error!(route = model, error = %e, "upstream request failed");
                Err(e)
            }
        }
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn info_text(&self) -> &str {
        &self.info_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::error::RelayError;

    fn config(endpoints: Vec<String>) -> RelayConfig {
        let mut config = ConfigLoader::builtin().unwrap().into_config().unwrap();
        config.endpoints = endpoints;
        config.api_keys = vec!["caller-key".to_string()];
        config.upstream_secret = Some("upstream-secret".to_string());
        config
    }

    #[test]
    fn test_from_config() {
        let relay = Relay::from_config(&config(vec![
            "http://gpt4.test".to_string(),
            String::new(),
            "http://llama.test".to_string(),
        ]))
        .unwrap();

        assert!(relay.endpoints().contains("gpt4"));
        assert!(!relay.endpoints().contains("cohere"));
        assert!(relay.endpoints().contains("llama"));
        assert!(relay.keys().contains("caller-key"));
        assert_eq!(relay.classifier().busy_phrases().len(), 2);
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let result = Relay::from_config(&config(vec!["::nope::".to_string()]));
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[tokio::test]
    async fn test_relay_validates_before_calling_upstream() {
        // Endpoint points nowhere; validation must fail first
        let relay = Relay::from_config(&config(vec!["http://127.0.0.1:9/".to_string()])).unwrap();

        assert_eq!(
            relay.relay("unknown", Some("hi"), Some("caller-key")).await,
            Err(RelayError::UnknownRoute("unknown".to_string()))
        );
        assert_eq!(
            relay.relay("gpt4", None, Some("caller-key")).await,
            Err(RelayError::MissingPrompt)
        );
        assert_eq!(
            relay.relay("gpt4", Some("hi"), Some("stolen")).await,
            Err(RelayError::InvalidKey)
        );
    }

    #[tokio::test]
    async fn test_relay_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{"status":true,"result":[{"response":"pong"}]}"#)
            .create_async()
            .await;

        let relay = Relay::from_config(&config(vec![server.url()])).unwrap();
        assert_eq!(
            relay.relay("gpt4", Some("ping"), Some("caller-key")).await,
            Ok("pong".to_string())
        );
    }
}
