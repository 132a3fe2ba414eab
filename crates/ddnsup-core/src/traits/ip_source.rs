// # Public IP Source Trait
//
// Defines the interface for learning the machine's externally visible IPv4
// address.
//
// ## Implementations
//
// - HTTP JSON endpoint: `ddnsup-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddnsup_core::PublicIpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* PublicIpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("public IP: {}", current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for public IP source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - One lookup per call: no caching between calls, no retries.
/// - Cancellation-safe: the orchestrator drops the future when the sibling
///   record read fails or the run times out.
/// - Never decides whether DNS needs updating (owned by `Updater`).
#[async_trait]
pub trait PublicIpSource: Send + Sync {
    /// Fetch the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address the outside world sees
    /// - `Err(Error)`: Network, HTTP status, or decode failure
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
