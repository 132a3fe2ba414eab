// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare DNS provider for ddnsup.
//
// ## Scope
//
// - ✅ Read one record by zone ID and record ID
// - ✅ Overwrite that record's content (A records only)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401, 403, 404, 409, 429, 5xx)
// - ✅ API token or legacy global key authentication
// - ❌ NO retry logic (a run is single-shot)
// - ❌ NO zone or record discovery by name (IDs come from configuration)
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or Debug output
// - Credentials MUST be provided via environment variables only
// - Provider MUST fail fast if credentials are missing or empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - DNS Record Details: GET `/zones/:zone_id/dns_records/:record_id`
// - Update DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddnsup_core::RecordRef;
use ddnsup_core::traits::DnsProvider;
use ddnsup_core::{Error, Result, parse_ipv4};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Environment variable holding a scoped API token
pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// Environment variable holding a legacy global API key
pub const API_KEY_ENV: &str = "CLOUDFLARE_API_KEY";

/// Environment variable holding the account email for the global API key
pub const API_EMAIL_ENV: &str = "CLOUDFLARE_EMAIL";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "CLOUDFLARE_BASE_URL";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "cloudflare";

/// How requests authenticate against the API
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Scoped API token with Zone:DNS:Edit permission
    Token(String),
    /// Legacy global API key plus account email
    GlobalKey {
        /// Account email
        email: String,
        /// Global API key
        key: String,
    },
}

impl Credentials {
    /// Pick credentials from a lookup
    ///
    /// An API token wins over a global key. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = non_empty(API_TOKEN_ENV) {
            return Ok(Self::Token(token));
        }

        match (non_empty(API_KEY_ENV), non_empty(API_EMAIL_ENV)) {
            (Some(key), Some(email)) => Ok(Self::GlobalKey { email, key }),
            (Some(_), None) => Err(Error::config(format!(
                "{} is set but {} is missing",
                API_KEY_ENV, API_EMAIL_ENV
            ))),
            _ => Err(Error::config(format!(
                "Cloudflare credentials are required. Set it via: export {}=your_token",
                API_TOKEN_ENV
            ))),
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::GlobalKey { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
        }
    }
}

// Custom Debug implementation that hides the secret
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<REDACTED>").finish(),
            Credentials::GlobalKey { email, .. } => f
                .debug_struct("GlobalKey")
                .field("email", email)
                .field("key", &"<REDACTED>")
                .finish(),
        }
    }
}

/// Cloudflare API v4 response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

/// Entry of the envelope's `errors` array
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// The subset of a DNS record the updater cares about
#[derive(Debug, Deserialize)]
struct DnsRecord {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
}

/// Body of the record edit call
#[derive(Debug, Serialize)]
struct RecordEdit {
    #[serde(rename = "type")]
    record_type: &'static str,
    content: String,
}

/// Cloudflare DNS provider
///
/// Constructed once by the caller and reused for both the read and the
/// write of a run.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the credentials.
#[derive(Debug, Clone)]
pub struct CloudflareProvider {
    /// Credentials
    /// ⚠️ NEVER log this value
    credentials: Credentials,

    /// API base URL, without trailing slash
    api_base: Url,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider against the public API
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_api_base(credentials, CLOUDFLARE_API_BASE)
    }

    /// Create a new Cloudflare provider against a custom API base URL
    pub fn with_api_base(credentials: Credentials, api_base: impl Into<String>) -> Result<Self> {
        let empty = match &credentials {
            Credentials::Token(token) => token.is_empty(),
            Credentials::GlobalKey { email, key } => email.is_empty() || key.is_empty(),
        };
        if empty {
            return Err(Error::config("Cloudflare credentials cannot be empty"));
        }

        let raw = api_base.into();
        let api_base = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| Error::config(format!("invalid API base URL {:?}: {}", raw, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "API base URL {:?} cannot hold a path",
                raw
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::network(format!("failed creating HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            api_base,
            client,
        })
    }

    /// Create a provider from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a provider from an arbitrary lookup
    ///
    /// Reads credentials and the optional base URL override.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;
        match lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::with_api_base(credentials, url.trim()),
            None => Self::new(credentials),
        }
    }

    /// The API base URL in use
    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    /// IDs are appended as escaped path segments, so a `/` or `?` in an ID
    /// cannot address a different endpoint.
    fn record_url(&self, record: &RecordRef) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "zones",
                record.zone_id.as_str(),
                "dns_records",
                record.record_id.as_str(),
            ]);
        }
        url
    }

    /// Send a request and decode the envelope's result
    async fn send<T>(&self, request: reqwest::RequestBuilder, operation: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .credentials
            .apply(request)
            .send()
            .await
            .map_err(|e| Error::network(format!("{} request failed: {}", operation, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed reading {} response: {}", operation, e)))?;

        if !status.is_success() {
            return Err(status_error(status, &body, operation));
        }

        decode_envelope(&body, operation)
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, body: &str, operation: &str) -> Error {
    let detail = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .map(|envelope| describe(&envelope.errors))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API credentials or insufficient permissions. Status: {} - {}",
            status, detail
        )),
        404 => Error::not_found(format!("DNS record not found: {}", detail)),
        409 => Error::provider(
            PROVIDER,
            format!(
                "Conflict: Record is being updated by another process. Status: {}",
                status
            ),
        ),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER,
            format!("Cloudflare server error (transient): {} - {}", status, detail),
        ),
        _ => Error::provider(
            PROVIDER,
            format!("{} failed: {} - {}", operation, status, detail),
        ),
    }
}

/// Decode a successful response body into its result
fn decode_envelope<T>(body: &str, operation: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| Error::from(e).context(format!("failed to parse {} response", operation)))?;

    if !envelope.success {
        return Err(Error::provider(
            PROVIDER,
            format!("{} unsuccessful: {}", operation, describe(&envelope.errors)),
        ));
    }

    envelope
        .result
        .ok_or_else(|| Error::decode(format!("{} response has no result", operation)))
}

fn describe(errors: &[ApiMessage]) -> String {
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a record's content, insisting on an A record
fn record_ip(record: &DnsRecord) -> Result<Ipv4Addr> {
    if record.record_type != "A" {
        return Err(Error::decode(format!(
            "record {} has type {}, expected A",
            record.id, record.record_type
        )));
    }
    parse_ipv4(&record.content)
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    /// ```
    async fn read_record(&self, record: &RecordRef) -> Result<Ipv4Addr> {
        tracing::debug!(
            "Reading Cloudflare DNS record {} in zone {}",
            record.record_id,
            record.zone_id
        );

        let dns_record: DnsRecord = self
            .send(self.client.get(self.record_url(record)), "record read")
            .await?;

        record_ip(&dns_record)
    }

    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    ///
    /// { "type": "A", "content": "1.2.3.4" }
    /// ```
    async fn update_record(&self, record: &RecordRef, new_ip: Ipv4Addr) -> Result<()> {
        tracing::info!(
            "Updating Cloudflare DNS record {} in zone {} -> {}",
            record.record_id,
            record.zone_id,
            new_ip
        );

        let payload = RecordEdit {
            record_type: "A",
            content: new_ip.to_string(),
        };

        let updated: DnsRecord = self
            .send(
                self.client.patch(self.record_url(record)).json(&payload),
                "record update",
            )
            .await?;

        if updated.content.trim() != payload.content {
            tracing::warn!(
                "Cloudflare echoed content {:?} after setting {}",
                updated.content,
                payload.content
            );
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
