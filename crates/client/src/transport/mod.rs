//! Content transport.
//!
//! ### Contract
//! - Every content endpoint answers `GET` with a JSON body.
//! - Bodies follow the `{success, data|message}` envelope, or are the bare
//!   payload; [`fetch_payload`] accepts both.
//! - Timeouts belong to the transport and surface as [`ClientError::Timeout`].

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;
use vellum_core::AppConfig;
use vellum_core::envelope::unwrap_payload;

pub use self::url::{UrlError, endpoint_url, parse_base};

use crate::ClientError;

/// Path of the content endpoint for a logical name.
pub fn content_endpoint(name: &str) -> String {
    format!("/api/content/{name}")
}

/// A logical cache key and the endpoint that produces its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub key: String,
    pub endpoint: String,
}

impl Target {
    pub fn new(key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self { key: key.into(), endpoint: endpoint.into() }
    }

    /// Target for a content name, keyed by the name itself.
    pub fn content(name: &str) -> Self {
        Self::new(name, content_endpoint(name))
    }
}

/// Issues `GET` requests for endpoint paths.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the raw JSON body of `endpoint`.
    async fn get_json(&self, endpoint: &str) -> Result<Value, ClientError>;
}

/// Fetch `endpoint` and unwrap its envelope.
///
/// # Errors
///
/// Transport failures pass through; `success: false` bodies become
/// [`ClientError::Envelope`] with the server's message.
pub async fn fetch_payload(transport: &dyn Transport, endpoint: &str) -> Result<Value, ClientError> {
    let body = transport.get_json(endpoint).await?;
    unwrap_payload(body).map_err(ClientError::Envelope)
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL endpoints are resolved against (default: http://127.0.0.1:8080)
    pub base_url: String,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// User agent string (default: "vellum/0.1")
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for TransportConfig {
    fn from(config: &AppConfig) -> Self {
        Self { base_url: config.base_url.clone(), timeout: config.timeout(), user_agent: config.user_agent.clone() }
    }
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base: ::url::Url,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, ClientError> {
        let base = parse_base(&config.base_url)?;
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &::url::Url {
        &self.base
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, endpoint: &str) -> Result<Value, ClientError> {
        let start = Instant::now();
        let url = endpoint_url(&self.base, endpoint)?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(%url, status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "content request");

        if !status.is_success() {
            // Failing endpoints still answer with an envelope; prefer its message.
            return match serde_json::from_slice::<Value>(&bytes).map(unwrap_payload) {
                Ok(Err(message)) => Err(ClientError::Envelope(message)),
                _ => Err(ClientError::Http { status: status.as_u16() }),
            };
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
    }
}
