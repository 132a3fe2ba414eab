//! Configuration types for the ddnsup updater
//!
//! Configuration comes from the environment only. Loading goes through a
//! lookup function so the rules can be exercised without touching the
//! process environment.

use crate::error::{Error, Result};
use std::fmt;

/// Environment variable holding the provider zone identifier
pub const ZONE_ID_ENV: &str = "CLOUDFLARE_ZONEID";

/// Environment variable holding the provider record identifier
pub const RECORD_ID_ENV: &str = "CLOUDFLARE_ENTRY_ID";

/// Reference to the single DNS A-record managed by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    /// Provider zone identifier
    pub zone_id: String,
    /// Provider record identifier within the zone
    pub record_id: String,
}

impl RecordRef {
    /// Create a record reference
    pub fn new(zone_id: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_id: record_id.into(),
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone_id, self.record_id)
    }
}

/// Updater configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// The record to keep in sync with the public IP
    pub record: RecordRef,
}

impl UpdaterConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup
    ///
    /// Both identifiers are required. A variable that is unset or contains
    /// only whitespace is reported as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let zone_id = required(&lookup, ZONE_ID_ENV)?;
        let record_id = required(&lookup, RECORD_ID_ENV)?;

        Ok(Self {
            record: RecordRef { zone_id, record_id },
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(Error::config(format!("{} is set but empty", key))),
        None => Err(Error::config(format!(
            "{} is required. Set it via: export {}=<id>",
            key, key
        ))),
    }
}
