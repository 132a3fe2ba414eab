//! One-shot update orchestration
//!
//! The Updater is responsible for:
//! - Reading the recorded IP from the DNS provider
//! - Fetching the current public IP
//! - Deciding whether the record is stale
//! - Overwriting the record when it is
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐      ┌────────────────┐
//! │ DnsProvider  │      │ PublicIpSource │
//! │ (read)       │      │ (current)      │
//! └──────┬───────┘      └───────┬────────┘
//!        └──────── try_join ────┘
//!                     │
//!                     ▼
//!              ┌─────────────┐
//!              │   decide    │── equal ──▶ Outcome::Unchanged
//!              └─────────────┘
//!                     │ differ
//!                     ▼
//!              ┌──────────────┐
//!              │ DnsProvider  │──────────▶ Outcome::Updated
//!              │ (update)     │
//!              └──────────────┘
//! ```
//!
//! The whole sequence runs under one timeout. The first failure in the
//! gather step drops the sibling future, which cancels its request.

use crate::config::RecordRef;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, PublicIpSource};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, info};

/// Default wall-clock budget for a whole run
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of comparing the recorded and current addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Record already holds the current address
    UpToDate,
    /// Record must be overwritten with the current address
    Update,
}

/// Compare the recorded address with the current one
pub fn decide(recorded: Ipv4Addr, current: Ipv4Addr) -> Decision {
    if recorded == current {
        Decision::UpToDate
    } else {
        Decision::Update
    }
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No write was needed
    Unchanged {
        /// The address held by both the record and the machine
        ip: Ipv4Addr,
    },
    /// The record was overwritten
    Updated {
        /// The address the record held before the run
        previous_ip: Ipv4Addr,
        /// The address now stored in the record
        new_ip: Ipv4Addr,
    },
}

/// One-shot DDNS updater
///
/// Owns its collaborators; the caller constructs them once and injects them.
///
/// ## Lifecycle
///
/// 1. Create with [`Updater::new()`]
/// 2. Call [`Updater::run()`] once
/// 3. Drop
pub struct Updater {
    /// Source of the current public IP
    ip_source: Box<dyn PublicIpSource>,

    /// DNS provider holding the record
    provider: Box<dyn DnsProvider>,

    /// The record to keep in sync
    record: RecordRef,

    /// Budget for gather, decide and update together
    timeout: Duration,
}

impl Updater {
    /// Create a new updater with the default timeout
    pub fn new(
        ip_source: Box<dyn PublicIpSource>,
        provider: Box<dyn DnsProvider>,
        record: RecordRef,
    ) -> Self {
        Self {
            ip_source,
            provider,
            record,
            timeout: DEFAULT_RUN_TIMEOUT,
        }
    }

    /// Override the run timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The record this updater manages
    pub fn record(&self) -> &RecordRef {
        &self.record
    }

    /// Run gather, decide and (if needed) update once
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: The record is now in sync
    /// - `Err(Error)`: The first failure, wrapped with context; on
    ///   [`Error::Timeout`] all in-flight work has been cancelled
    pub async fn run(&self) -> Result<Outcome> {
        tokio::time::timeout(self.timeout, self.run_once())
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }

    async fn run_once(&self) -> Result<Outcome> {
        debug!(
            record = %self.record,
            provider = self.provider.provider_name(),
            source = self.ip_source.source_name(),
            "Gathering recorded and current IP"
        );

        let (recorded_ip, current_ip) =
            tokio::try_join!(self.read_recorded_ip(), self.fetch_current_ip())?;

        match decide(recorded_ip, current_ip) {
            Decision::UpToDate => {
                info!(
                    "no need to update the entry since it contains already the right value. {}: {}; Current IP: {}",
                    self.provider.provider_name(),
                    recorded_ip,
                    current_ip
                );
                Ok(Outcome::Unchanged { ip: current_ip })
            }
            Decision::Update => {
                info!(
                    "current ip ({}) not the same with the one stored in {} ({}). updating...",
                    current_ip,
                    self.provider.provider_name(),
                    recorded_ip
                );

                self.provider
                    .update_record(&self.record, current_ip)
                    .await
                    .map_err(|e| {
                        e.context(format!(
                            "failed updating the dns entry {:?} from zone {:?} to {:?}",
                            self.record.record_id,
                            self.record.zone_id,
                            current_ip.to_string()
                        ))
                    })?;

                info!("update done from {} to {}", recorded_ip, current_ip);
                Ok(Outcome::Updated {
                    previous_ip: recorded_ip,
                    new_ip: current_ip,
                })
            }
        }
    }

    async fn read_recorded_ip(&self) -> Result<Ipv4Addr> {
        let ip = self.provider.read_record(&self.record).await.map_err(|e| {
            e.context(format!(
                "failed reading the dns entry {:?} from zone {:?}",
                self.record.record_id, self.record.zone_id
            ))
        })?;
        debug!(%ip, "Recorded IP");
        Ok(ip)
    }

    async fn fetch_current_ip(&self) -> Result<Ipv4Addr> {
        let ip = self.ip_source.current().await.map_err(|e| {
            e.context("failed to figure out the current IP assigned by the ISP")
        })?;
        debug!(%ip, "Current public IP");
        Ok(ip)
    }
}
