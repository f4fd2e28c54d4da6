//! Upstream HTTP Client
//!
//! Async client that calls an upstream endpoint with a prompt and returns
//! its JSON body untouched.

use crate::client::transport::{TransportError, TransportErrorKind};
use crate::config::UpstreamConfig;
use crate::error::{RelayError, Result};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde_json::Value;

/// HTTP client holding the relay's own upstream credential
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    /// Inner reqwest client
    client: Client,

    /// Sent as `key` on every upstream call
    secret: String,

    /// Body size limit
    max_body_bytes: usize,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(config: &UpstreamConfig, secret: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(10)
            .user_agent(concat!("relaygate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            secret: secret.unwrap_or_default(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// GET `{endpoint}?prompt=..&key=..` and decode the body as JSON.
    ///
    /// The HTTP status is not inspected; upstreams report failures in the
    /// body. An empty body decodes to `Value::Null`. Bodies larger than
    /// `max_body_bytes` fail as [`TransportErrorKind::Decode`].
    pub async fn fetch(
        &self,
        endpoint: &Url,
        prompt: &str,
    ) -> std::result::Result<Value, TransportError> {
        let mut response = self
            .client
            .get(endpoint.clone())
            .query(&[("prompt", prompt), ("key", self.secret.as_str())])
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(self.body_too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.body_too_large());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            host = endpoint.host_str().unwrap_or_default(),
            %status,
            bytes = body.len(),
            "upstream responded"
        );

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&body)?)
    }

    fn body_too_large(&self) -> TransportError {
        TransportError::new(
            TransportErrorKind::Decode,
            format!("upstream body exceeds {} bytes", self.max_body_bytes),
        )
    }
}
