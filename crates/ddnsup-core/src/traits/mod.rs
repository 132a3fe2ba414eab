//! Core traits for the ddnsup updater
//!
//! - [`PublicIpSource`]: Learn the current public IPv4 address
//! - [`DnsProvider`]: Read and overwrite a DNS A-record

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::PublicIpSource;
pub use dns_provider::DnsProvider;
