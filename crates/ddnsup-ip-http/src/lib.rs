// # HTTP IP Source
//
// This crate provides the public IP source for ddnsup.
//
// ## Purpose
//
// Learns the machine's externally visible IPv4 address by asking a
// third-party "what is my IP" service over HTTPS. The default service is the
// NTP Pool mapper, which answers with a JSON object:
//
// ```json
// { "HTTP": "203.0.113.7", "DNS": "...", ... }
// ```
//
// ## Architecture
//
// One GET per call. No caching, no polling, no retries: the updater runs once
// and the external scheduler decides when to run again.

use ddnsup_core::traits::PublicIpSource;
use ddnsup_core::{Error, Result, parse_ipv4};

use serde_json::Value;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default service reporting the caller's IP
pub const DEFAULT_ENDPOINT: &str = "https://www.mapper.ntppool.org/json";

/// JSON field holding the caller's IP in the default service's response
pub const DEFAULT_FIELD: &str = "HTTP";

/// Default HTTP timeout for the lookup (10 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP JSON public IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the JSON document from
    url: String,

    /// Field carrying the IP string
    field: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source for the default service
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, DEFAULT_FIELD)
    }

    /// Create a source for a custom JSON endpoint
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning a JSON object
    /// - `field`: Top-level field holding the IP string
    pub fn with_endpoint(url: impl Into<String>, field: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::network(format!("failed creating HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            field: field.into(),
            client,
        })
    }

    /// The URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the JSON document and extract the IP
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching current IP from {}", self.url);

        let request = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .build()
            .map_err(|e| {
                Error::network(format!("failed creating request to get current ip: {}", e))
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::network(format!("failed requesting the current ip: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered with status {}",
                self.url,
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            Error::network(format!("failed reading the current ip response: {}", e))
        })?;

        parse_response(&body, &self.field)
    }
}

/// Extract and parse the IP field from a JSON response body
pub fn parse_response(body: &str, field: &str) -> Result<Ipv4Addr> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| Error::from(e).context("failed unmarshalling the current ip response"))?;

    let text = match json.get(field) {
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(Error::decode(format!(
                "field {:?} is not a string: {}",
                field, other
            )));
        }
        None => {
            return Err(Error::decode(format!(
                "field {:?} missing from current ip response",
                field
            )));
        }
    };

    parse_ipv4(text)
}

#[async_trait::async_trait]
impl PublicIpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("Current IP reported by {}: {}", self.url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
