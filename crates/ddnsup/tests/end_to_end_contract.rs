//! Contract Test: One Run Against HTTP Fakes
//!
//! Constraints verified:
//! - Equal addresses leave the record alone and say so in the log
//! - Distinct addresses produce exactly one PATCH with the public IP
//! - A failed record read never reaches the PATCH endpoint
//!
//! The real public IP source and Cloudflare provider talk to one local mock
//! server, so the whole path from HTTP to decision to write is covered.

use ddnsup_core::{Outcome, RecordRef, Updater};
use ddnsup_ip_http::HttpIpSource;
use ddnsup_provider_cloudflare::{CloudflareProvider, Credentials};
use serde_json::json;
use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECORD_PATH: &str = "/client/v4/zones/z/dns_records/r";

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

fn record_body(content: &str) -> serde_json::Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": {"id": "r", "type": "A", "content": content}
    })
}

async fn serve_public_ip(server: &MockServer, ip: &str) {
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "HTTP": ip })))
        .mount(server)
        .await;
}

async fn serve_record(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_body(content)))
        .expect(1)
        .mount(server)
        .await;
}

fn updater_for(server: &MockServer) -> Updater {
    let ip_source =
        HttpIpSource::with_endpoint(format!("{}/json", server.uri()), "HTTP").unwrap();
    let provider = CloudflareProvider::with_api_base(
        Credentials::Token("tok".to_string()),
        format!("{}/client/v4", server.uri()),
    )
    .unwrap();

    Updater::new(
        Box::new(ip_source),
        Box::new(provider),
        RecordRef::new("z", "r"),
    )
}

#[tokio::test]
async fn matching_record_is_left_alone() {
    let (logs, _guard) = capture_logs();
    let server = MockServer::start().await;
    serve_public_ip(&server, "1.2.3.4").await;
    serve_record(&server, "1.2.3.4").await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = updater_for(&server).run().await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Unchanged {
            ip: Ipv4Addr::new(1, 2, 3, 4)
        }
    );
    let output = logs.contents();
    assert!(output.contains("no need to update"), "{}", output);
    assert!(!output.contains("updating..."), "{}", output);
}

#[tokio::test]
async fn changed_address_is_written_once() {
    let (logs, _guard) = capture_logs();
    let server = MockServer::start().await;
    serve_public_ip(&server, "5.6.7.8").await;
    serve_record(&server, "1.2.3.4").await;
    Mock::given(method("PATCH"))
        .and(path(RECORD_PATH))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({"type": "A", "content": "5.6.7.8"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_body("5.6.7.8")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = updater_for(&server).run().await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            previous_ip: Ipv4Addr::new(1, 2, 3, 4),
            new_ip: Ipv4Addr::new(5, 6, 7, 8),
        }
    );
    let output = logs.contents();
    assert!(output.contains("update done from 1.2.3.4 to 5.6.7.8"), "{}", output);
    assert!(!output.contains("no need to update"), "{}", output);
}

#[tokio::test]
async fn failed_record_read_never_patches() {
    let server = MockServer::start().await;
    serve_public_ip(&server, "5.6.7.8").await;
    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "errors": [{"code": 81044, "message": "Record does not exist."}],
            "result": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = updater_for(&server).run().await.unwrap_err();

    assert!(err.to_string().contains("failed reading the dns entry \"r\""), "{}", err);
}
