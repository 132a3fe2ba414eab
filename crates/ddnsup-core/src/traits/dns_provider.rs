// # DNS Provider Trait
//
// Defines the interface for reading and overwriting a single DNS A-record
// via a provider's management API.
//
// ## Implementations
//
// - Cloudflare: `ddnsup-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddnsup_core::{DnsProvider, RecordRef};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let record = RecordRef::new("zone-id", "record-id");
//
//     let recorded = provider.read_record(&record).await?;
//     provider.update_record(&record, std::net::Ipv4Addr::new(5, 6, 7, 8)).await?;
//
//     Ok(())
// }
// ```

use crate::config::RecordRef;
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// Providers are isolated, stateless, single-shot API clients:
///
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses into typed results
/// - ❌ Retry or back off (a run is single-shot; the scheduler reruns it)
/// - ❌ Decide whether an update is needed (owned by `Updater`)
/// - ❌ Cache anything beyond a single request
///
/// Errors are returned classified but without record identifiers; the
/// orchestrator adds that context.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Read the record's current content as an IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address currently stored in the record
    /// - `Err(Error)`: Network, auth, not-found, provider, or decode failure
    async fn read_record(&self, record: &RecordRef) -> Result<Ipv4Addr, crate::Error>;

    /// Overwrite the record's content with `new_ip`
    ///
    /// The caller has already determined the write is necessary.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the new content
    /// - `Err(Error)`: Network, auth, not-found, conflict, or provider failure
    async fn update_record(&self, record: &RecordRef, new_ip: Ipv4Addr)
    -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
