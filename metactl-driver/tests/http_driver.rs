//! `HttpDriver` against a single-threaded stub engine on 127.0.0.1.
//!
//! Each stub answers a fixed list of canned responses, one per connection,
//! and hands back what it received.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use metactl_core::{MetadataDocument, ServerConfig};
use metactl_driver::{http::ADMIN_SECRET_HEADER, DriverError, HttpDriver, MetadataDriver};
use serde_json::{json, Value};

struct Received {
    path: String,
    headers: HashMap<String, String>,
    body: Value,
}

struct StubEngine {
    endpoint: String,
    handle: JoinHandle<Vec<Received>>,
}

impl StubEngine {
    fn start(responses: Vec<(u16, Value)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let endpoint = format!("http://{}", listener.local_addr().expect("addr"));
        let handle = thread::spawn(move || {
            let mut received = Vec::new();
            for (status, body) in responses {
                let (stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream);

                let mut request_line = String::new();
                reader.read_line(&mut request_line).expect("request line");
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_string();

                let mut headers = HashMap::new();
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("header");
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                    }
                }

                let length: usize = headers
                    .get("content-length")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                let mut raw = vec![0u8; length];
                reader.read_exact(&mut raw).expect("body");
                let body_in: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);
                received.push(Received {
                    path,
                    headers,
                    body: body_in,
                });

                let payload = body.to_string();
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                    payload.len()
                );
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).expect("write");
                stream.flush().expect("flush");
            }
            received
        });
        Self { endpoint, handle }
    }

    fn driver(&self, secret: Option<&str>) -> HttpDriver {
        let server =
            ServerConfig::new(&self.endpoint, secret.map(str::to_string)).expect("server config");
        HttpDriver::new(&server)
    }

    fn finish(self) -> Vec<Received> {
        self.handle.join().expect("stub thread")
    }
}

#[test]
fn export_posts_export_metadata_with_secret() {
    let stub = StubEngine::start(vec![(200, json!({"version": 2, "tables": []}))]);
    let mut driver = stub.driver(Some("s3cret"));

    let doc = driver.export().expect("export");
    assert_eq!(doc, MetadataDocument::from(json!({"version": 2, "tables": []})));

    let received = stub.finish();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].path, "/v1/query");
    assert_eq!(received[0].body, json!({"type": "export_metadata", "args": {}}));
    assert_eq!(
        received[0]
            .headers
            .get(&ADMIN_SECRET_HEADER.to_ascii_lowercase())
            .map(String::as_str),
        Some("s3cret")
    );
}

#[test]
fn no_secret_header_without_secret() {
    let stub = StubEngine::start(vec![(200, json!({"message": "success"}))]);
    let mut driver = stub.driver(None);
    driver.reload().expect("reload");

    let received = stub.finish();
    assert_eq!(received[0].body["type"], "reload_metadata");
    assert!(!received[0]
        .headers
        .contains_key(&ADMIN_SECRET_HEADER.to_ascii_lowercase()));
}

#[test]
fn primitive_operation_names() {
    let stub = StubEngine::start(vec![
        (200, json!({"message": "success"})),
        (200, json!({"message": "success"})),
        (200, json!({"message": "success"})),
    ]);
    let mut driver = stub.driver(None);
    driver.reset().expect("reset");
    driver.drop_inconsistent_objects().expect("drop");
    driver
        .apply(&MetadataDocument::from(json!({"tables": []})))
        .expect("apply");

    let received = stub.finish();
    let ops: Vec<&str> = received
        .iter()
        .map(|r| r.body["type"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        ops,
        ["clear_metadata", "drop_inconsistent_metadata", "replace_metadata"]
    );
    assert_eq!(received[2].body["args"], json!({"tables": []}));
}

#[test]
fn rejection_carries_engine_reason() {
    let stub = StubEngine::start(vec![(
        400,
        json!({"code": "parse-failed", "error": "field \"tables\" not found", "path": "$.args"}),
    )]);
    let mut driver = stub.driver(None);

    let err = driver
        .apply(&MetadataDocument::from(json!({})))
        .expect_err("apply should be rejected");
    match err {
        DriverError::Rejected {
            status,
            code,
            message,
            path,
        } => {
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("parse-failed"));
            assert_eq!(message, "field \"tables\" not found");
            assert_eq!(path.as_deref(), Some("$.args"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    stub.finish();
}

#[test]
fn inconsistent_objects_are_mapped_in_order() {
    let stub = StubEngine::start(vec![(
        200,
        json!({
            "is_consistent": false,
            "inconsistent_objects": [
                {"type": "view", "reason": "table not found", "definition": "users_view"},
                {"type": "object_relation", "reason": "column missing",
                 "definition": {"name": "author", "table": "article"}}
            ]
        }),
    )]);
    let mut driver = stub.driver(None);

    let status = driver.get_inconsistent_objects().expect("get");
    assert!(!status.is_consistent);
    assert_eq!(status.objects.len(), 2);
    assert_eq!(status.objects[0].name, "users_view");
    assert_eq!(status.objects[0].description, "table users_view");
    assert_eq!(status.objects[0].reason, "table not found");
    assert_eq!(status.objects[1].name, "author");

    let received = stub.finish();
    assert_eq!(received[0].body["type"], "get_inconsistent_metadata");
}

#[test]
fn malformed_inconsistency_response_is_invalid() {
    let stub = StubEngine::start(vec![(200, json!({"unexpected": true}))]);
    let mut driver = stub.driver(None);
    let err = driver.get_inconsistent_objects().unwrap_err();
    assert!(matches!(err, DriverError::InvalidResponse { .. }));
    stub.finish();
}

#[test]
fn bulk_query_returns_one_result_per_request() {
    let stub = StubEngine::start(vec![(200, json!([{"message": "success"}, {"tables": []}]))]);
    let mut driver = stub.driver(None);

    let requests = [
        json!({"type": "reload_metadata", "args": {}}),
        json!({"type": "export_metadata", "args": {}}),
    ];
    let results = driver.query(&requests).expect("query");
    assert_eq!(results.len(), 2);

    let received = stub.finish();
    assert_eq!(received[0].body["type"], "bulk");
    assert_eq!(received[0].body["args"], Value::Array(requests.to_vec()));
}

#[test]
fn bulk_failure_is_annotated_with_position() {
    let stub = StubEngine::start(vec![(
        400,
        json!({"code": "already-exists", "error": "table exists", "path": "$.args[1].args"}),
    )]);
    let mut driver = stub.driver(None);

    let err = driver
        .query(&[json!({"type": "a"}), json!({"type": "b"})])
        .unwrap_err();
    match err {
        DriverError::QueryFailed { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(*source, DriverError::Rejected { status: 400, .. }));
        }
        other => panic!("expected QueryFailed, got {other:?}"),
    }
    stub.finish();
}

#[test]
fn unreachable_engine_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let server = ServerConfig::new(&format!("http://127.0.0.1:{port}"), None).unwrap();
    let mut driver = HttpDriver::new(&server);

    let err = driver.export().unwrap_err();
    match err {
        DriverError::Transport { url, .. } => {
            assert_eq!(url, format!("http://127.0.0.1:{port}/v1/query"));
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}
