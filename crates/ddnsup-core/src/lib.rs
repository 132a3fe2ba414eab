// # ddnsup-core
//
// Core library for the one-shot dynamic-DNS updater.
//
// ## Architecture Overview
//
// A run compares the machine's public IPv4 address with the content of one
// DNS A-record and overwrites the record when they differ:
// - **PublicIpSource**: Trait for learning the current public IP
// - **DnsProvider**: Trait for reading and overwriting the record
// - **Updater**: Orchestrates gather → decide → update under one timeout
// - **UpdaterConfig**: Environment-driven record reference
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Orchestration is separate from integrations
// 2. **Injected Clients**: Integrations are constructed once by the caller
// 3. **Single-Shot**: No retries, no state; the scheduler reruns the program
// 4. **Library-First**: The binary is a thin shell over this crate

pub mod traits;
pub mod updater;
pub mod config;
pub mod error;
pub mod ip;

// Re-export core types for convenience
pub use traits::{DnsProvider, PublicIpSource};
pub use updater::{Decision, Outcome, Updater, DEFAULT_RUN_TIMEOUT, decide};
pub use config::{RecordRef, UpdaterConfig};
pub use error::{Error, Result};
pub use ip::parse_ipv4;
