//! Error types for the ddnsup updater
//!
//! Every failure in a run is one of these variants. Operations that need to
//! say *which* record or stage failed wrap the underlying error with
//! [`Error::context`]. The wrapper only displays its own text; the wrapped
//! error stays reachable through `source()`, so `{:#}` in anyhow prints each
//! link once.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for ddnsup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ddnsup updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request construction or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from a plain HTTP endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// Malformed JSON, missing field, or unparsable address
    #[error("Decode error: {0}")]
    Decode(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The run did not finish within its wall-clock budget
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// An error wrapped with a description of the failing operation
    #[error("{context}")]
    Context {
        /// What was being attempted
        context: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with a description of the operation that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any context wrappers
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Whether the root cause is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self.root_cause(), Error::Config(_))
    }

    /// Whether the root cause is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self.root_cause(), Error::Decode(_))
    }

    /// Whether the root cause is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self.root_cause(), Error::Timeout(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
