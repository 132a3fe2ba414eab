//! Test doubles and common utilities for updater contract tests
//!
//! These doubles record how they were called and can be told to fail or to
//! hang, which is enough to pin down the orchestration contract without any
//! network access.

#![allow(dead_code)]

use ddnsup_core::error::{Error, Result};
use ddnsup_core::traits::{DnsProvider, PublicIpSource};
use ddnsup_core::{RecordRef, Updater};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a double does when called
#[derive(Clone)]
pub enum Behavior {
    /// Answer with this address
    Answer(Ipv4Addr),
    /// Answer with the address after a delay
    AnswerAfter(Ipv4Addr, Duration),
    /// Fail with an error built by this function
    Fail(fn() -> Error),
    /// Fail after a delay, giving the sibling lookup time to start
    FailAfter(fn() -> Error, Duration),
    /// Never complete
    Hang,
}

/// Sets a flag if dropped while still armed, so tests can observe cancellation
struct CancelGuard {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

async fn behave(
    behavior: &Behavior,
    finished: &Arc<AtomicBool>,
    cancelled: &Arc<AtomicBool>,
) -> Result<Ipv4Addr> {
    let mut guard = CancelGuard {
        flag: Arc::clone(cancelled),
        armed: true,
    };
    let result = match behavior {
        Behavior::Answer(ip) => Ok(*ip),
        Behavior::AnswerAfter(ip, delay) => {
            tokio::time::sleep(*delay).await;
            Ok(*ip)
        }
        Behavior::Fail(make) => Err(make()),
        Behavior::FailAfter(make, delay) => {
            tokio::time::sleep(*delay).await;
            Err(make())
        }
        Behavior::Hang => std::future::pending().await,
    };
    guard.armed = false;
    finished.store(true, Ordering::SeqCst);
    result
}

/// A scripted PublicIpSource
#[derive(Clone)]
pub struct MockIpSource {
    behavior: Behavior,
    call_count: Arc<AtomicUsize>,
    finished: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl MockIpSource {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn answering(ip: Ipv4Addr) -> Self {
        Self::new(Behavior::Answer(ip))
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Whether an in-flight current() future was dropped before finishing
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether a current() call ran to completion
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PublicIpSource for MockIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        behave(&self.behavior, &self.finished, &self.cancelled).await
    }

    fn source_name(&self) -> &'static str {
        "mock-ip"
    }
}

/// A scripted DnsProvider that records update calls
#[derive(Clone)]
pub struct MockDnsProvider {
    read_behavior: Behavior,
    update_failure: Option<fn() -> Error>,
    read_count: Arc<AtomicUsize>,
    read_finished: Arc<AtomicBool>,
    read_cancelled: Arc<AtomicBool>,
    updates: Arc<Mutex<Vec<(RecordRef, Ipv4Addr)>>>,
}

impl MockDnsProvider {
    pub fn new(read_behavior: Behavior) -> Self {
        Self {
            read_behavior,
            update_failure: None,
            read_count: Arc::new(AtomicUsize::new(0)),
            read_finished: Arc::new(AtomicBool::new(false)),
            read_cancelled: Arc::new(AtomicBool::new(false)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider whose record holds `ip`
    pub fn holding(ip: Ipv4Addr) -> Self {
        Self::new(Behavior::Answer(ip))
    }

    /// Make update_record() fail
    pub fn failing_updates(mut self, make: fn() -> Error) -> Self {
        self.update_failure = Some(make);
        self
    }

    /// Get the number of times read_record() was called
    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Whether an in-flight read_record() future was dropped before finishing
    pub fn read_was_cancelled(&self) -> bool {
        self.read_cancelled.load(Ordering::SeqCst)
    }

    /// All update_record() calls, in order
    pub fn updates(&self) -> Vec<(RecordRef, Ipv4Addr)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn read_record(&self, _record: &RecordRef) -> Result<Ipv4Addr> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        behave(&self.read_behavior, &self.read_finished, &self.read_cancelled).await
    }

    async fn update_record(&self, record: &RecordRef, new_ip: Ipv4Addr) -> Result<()> {
        self.updates.lock().unwrap().push((record.clone(), new_ip));
        match self.update_failure {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock-dns"
    }
}

/// The record every contract test manages
pub fn test_record() -> RecordRef {
    RecordRef::new("zone-123", "record-456")
}

/// Build an updater over clones of the doubles, so the test keeps handles
/// for inspecting calls afterwards
pub fn updater_for(ip_source: &MockIpSource, provider: &MockDnsProvider) -> Updater {
    Updater::new(
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        test_record(),
    )
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}

/// Render an error and every `source()` below it, outermost first, the way
/// anyhow's `{:#}` does
pub fn render_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
