// # ddnsup - one-shot DDNS updater
//
// This binary is a THIN integration layer. All update logic lives in
// ddnsup-core; this file only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Constructs the Cloudflare provider and the public IP source once
// 4. Runs the updater a single time and maps the result to an exit code
//
// Recurring execution is the job of a systemd timer or cron.
//
// ## Configuration
//
// ### Record
// - `CLOUDFLARE_ZONEID`: Zone ID (required)
// - `CLOUDFLARE_ENTRY_ID`: DNS record ID (required)
//
// ### Credentials
// - `CLOUDFLARE_API_TOKEN`: API token with Zone:DNS:Edit permission
// - `CLOUDFLARE_API_KEY` + `CLOUDFLARE_EMAIL`: legacy global key (alternative)
// - `CLOUDFLARE_BASE_URL`: API base URL override (optional)
//
// ### Logging
// - `DDNSUP_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_ZONEID=023e105f4ecef8ad9ca31a8372d0c353
// export CLOUDFLARE_ENTRY_ID=372e67954025e0ba6aaa6d586b9e0b59
// export CLOUDFLARE_API_TOKEN=your_token
//
// ddnsup
// ddnsup version
// ```

mod version;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ddnsup_core::{Outcome, Updater, UpdaterConfig};
use ddnsup_ip_http::HttpIpSource;
use ddnsup_provider_cloudflare::CloudflareProvider;
use std::env;
use std::future::Future;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::version::BuildInfo;

/// Point one Cloudflare A-record at this machine's public IPv4 address.
///
/// Runs once and exits.
#[derive(Parser, Debug)]
#[command(name = "ddnsup")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print version, commit and build date, then exit
    Version,
}

/// Exit codes for different termination scenarios
///
/// - 0: Record already correct, or updated
/// - 1: Configuration error
/// - 2: Runtime error (lookup, update, timeout, interrupt)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    updater: UpdaterConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let updater = UpdaterConfig::from_lookup(&lookup)?;

        let raw_level = lookup("DDNSUP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_level = match raw_level.trim().to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "DDNSUP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                raw_level
            ),
        };

        Ok(Self { updater, log_level })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.command == Some(Command::Version) {
        println!("{}", BuildInfo::current());
        return DdnsExitCode::Success.into();
    }

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let provider = match CloudflareProvider::from_env() {
        Ok(provider) => provider,
        Err(e) if e.is_config() => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
        Err(e) => {
            eprintln!("Failed to create Cloudflare client: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let ip_source = match HttpIpSource::new() {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create public IP client: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    info!(
        zone_id = %config.updater.record.zone_id,
        record_id = %config.updater.record.record_id,
        ip_source = %ip_source.url(),
        "Starting ddnsup"
    );

    let updater = Updater::new(
        Box::new(ip_source),
        Box::new(provider),
        config.updater.record,
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(&updater, wait_for_shutdown())) {
        Ok(_) => DdnsExitCode::Success.into(),
        Err(e) => {
            error!("{:#}", e);
            DdnsExitCode::RuntimeError.into()
        }
    }
}

/// Run the updater once, giving up early when `shutdown` resolves
async fn run<S>(updater: &Updater, shutdown: S) -> Result<Outcome>
where
    S: Future<Output = &'static str>,
{
    tokio::select! {
        outcome = updater.run() => outcome.context("update run failed"),
        signal = shutdown => anyhow::bail!("interrupted by {} before the run completed", signal),
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> &'static str {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => return signal_setup_failed("SIGTERM", e).await,
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(sigint) => sigint,
        Err(e) => return signal_setup_failed("SIGINT", e).await,
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT",
        Err(e) => signal_setup_failed("CTRL-C", e).await,
    }
}

/// Never resolves; the run is still bounded by its own timeout.
async fn signal_setup_failed(name: &str, err: std::io::Error) -> &'static str {
    warn!("Failed to setup {} handler: {}", name, err);
    std::future::pending().await
}
