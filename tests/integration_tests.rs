//! Integration tests for pushing entries to Loki

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use http::{Request, Response, StatusCode};
use lokihook::client::Logger;
use lokihook::hook::{HttpClient, Labels, LevelMap, LokiHook, LokiHookOptions};
use lokihook::loki::Batch;
use lokihook::types::{LogEntry, LogLevel};
use lokihook::{LokiError, Result};
use mockito::{Matcher, Server};
use std::sync::Arc;
use tokio::sync::Mutex;

const PUSH_PATH: &str = "/loki/api/v1/push";

/// Formatter that pushes the bare message
fn message_only(entry: &LogEntry) -> Result<Vec<u8>> {
    Ok(entry.message.clone().into_bytes())
}

fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Transport double that records requests and answers with a fixed status
#[derive(Clone)]
struct RecordingClient {
    status: StatusCode,
    requests: Arc<Mutex<Vec<Request<Vec<u8>>>>>,
}

impl RecordingClient {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl HttpClient for RecordingClient {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        self.requests.lock().await.push(request);
        let mut response = Response::new(b"recorded".to_vec());
        *response.status_mut() = self.status;
        Ok(response)
    }
}

/// Test the basic push against a Loki stand-in
#[tokio::test]
async fn test_push_single_entry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PUSH_PATH)
        .match_header("content-type", "application/json")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Regex(
            r#"^\{"streams":\[\{"stream":\{"app":"svc","level":"info"\},"values":\[\["\d+","hi"\]\]\}\]\}$"#
                .to_string(),
        ))
        .with_status(204)
        .create_async()
        .await;

    let options = LokiHookOptions::new()
        .with_formatter(message_only)
        .with_static_labels(labels(&[("app", "svc")]));
    let hook = LokiHook::with_options(&server.url(), options, &[]);

    hook.fire(&LogEntry::new(LogLevel::Info, "hi")).await.unwrap();
    mock.assert_async().await;
}

/// Test that configured credentials become a basic auth header
#[tokio::test]
async fn test_basic_auth_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PUSH_PATH)
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .with_status(204)
        .create_async()
        .await;

    let options = LokiHookOptions::new().with_basic_auth("user", "pass");
    let hook = LokiHook::with_options(&server.url(), options, &[]);

    hook.fire(&LogEntry::new(LogLevel::Warn, "auth")).await.unwrap();
    mock.assert_async().await;
}

/// Test that a non-2xx answer surfaces status and body
#[tokio::test]
async fn test_remote_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PUSH_PATH)
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;

    let hook = LokiHook::new(&server.url(), &[]);
    let err = hook
        .fire(&LogEntry::new(LogLevel::Error, "boom"))
        .await
        .unwrap_err();

    match &err {
        LokiError::Remote { status, body } => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "oops");
        }
        other => panic!("Expected Remote error, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("oops"));
    mock.assert_async().await;
}

/// Test that any 2xx status is success
#[tokio::test]
async fn test_created_is_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PUSH_PATH)
        .with_status(201)
        .with_body("ignored")
        .create_async()
        .await;

    let hook = LokiHook::new(&server.url(), &[]);
    assert!(hook.fire(&LogEntry::new(LogLevel::Info, "ok")).await.is_ok());
    mock.assert_async().await;
}

/// Test that a 4xx answer is also a remote error
#[tokio::test]
async fn test_bad_request_is_remote_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PUSH_PATH)
        .with_status(400)
        .with_body("entry too far behind")
        .create_async()
        .await;

    let hook = LokiHook::new(&server.url(), &[]);
    let result = hook.fire(&LogEntry::new(LogLevel::Info, "late")).await;
    assert!(matches!(
        result,
        Err(LokiError::Remote { status, ref body }) if status == StatusCode::BAD_REQUEST && body == "entry too far behind"
    ));
}

/// Test that an unreachable host is a transport error
#[tokio::test]
async fn test_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let hook = LokiHook::new(&format!("http://{}", addr), &[]);
    let result = hook.fire(&LogEntry::new(LogLevel::Info, "lost")).await;
    assert!(matches!(result, Err(LokiError::Transport(_))));
}

/// Test the request handed to a custom transport
#[tokio::test]
async fn test_custom_http_client() {
    let client = RecordingClient::new(StatusCode::NO_CONTENT);
    let options = LokiHookOptions::new()
        .with_http_client(client.clone())
        .with_formatter(message_only)
        .with_basic_auth("grafana", "p@ss:word")
        .with_dynamic_label_provider(|entry: &LogEntry| {
            labels(&[("app", "dynamic"), ("user", entry.fields["user"].as_str())])
        })
        .with_static_labels(labels(&[("app", "static"), ("level", "ignored")]))
        .with_level_map(LevelMap::from([(LogLevel::Error, "my_error".to_string())]));
    let hook = LokiHook::with_options("http://x", options, &[]);

    let timestamp = Utc.timestamp_opt(1_700_000_000, 1).unwrap();
    let entry = LogEntry::new(LogLevel::Error, "hi")
        .with_timestamp(timestamp)
        .with_field("user", "bob");
    hook.fire(&entry).await.unwrap();

    let requests = client.requests.lock().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(request.method(), http::Method::POST);
    assert_eq!(request.uri(), "http://x/loki/api/v1/push");
    assert_eq!(request.headers()["content-type"], "application/json");

    let auth = request.headers()["authorization"].to_str().unwrap();
    let decoded = STANDARD.decode(auth.strip_prefix("Basic ").unwrap()).unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "grafana:p@ss:word");

    let batch = Batch::from_json(request.body()).unwrap();
    assert_eq!(batch.streams.len(), 1);
    let stream = &batch.streams[0];
    assert_eq!(stream.label("app"), Some("static"));
    assert_eq!(stream.label("user"), Some("bob"));
    assert_eq!(stream.label("level"), Some("my_error"));
    assert_eq!(
        stream.entries,
        vec![["1700000000000000001".to_string(), "hi".to_string()]]
    );
}

/// Test firing the same hook from many tasks at once
#[tokio::test]
async fn test_concurrent_fires() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PUSH_PATH)
        .with_status(204)
        .expect(20)
        .create_async()
        .await;

    let hook = Arc::new(LokiHook::new(&server.url(), &[]));

    let mut handles = vec![];
    for i in 0..20 {
        let hook = Arc::clone(&hook);
        handles.push(tokio::spawn(async move {
            let entry = LogEntry::new(LogLevel::Info, format!("Message {}", i));
            hook.fire(&entry).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    mock.assert_async().await;
}

/// Test that the logger only fires the hook for its levels
#[tokio::test]
async fn test_logger_routes_to_loki() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PUSH_PATH)
        .match_body(Matcher::Regex(r#""level":"error""#.to_string()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let hook = LokiHook::new(&server.url(), &[LogLevel::Error]);
    let mut logger = Logger::new(LogLevel::Trace);
    logger.add_hook(Arc::new(hook));

    logger.info("not shipped").await.unwrap();
    logger.debug("not shipped").await.unwrap();
    logger.error("shipped").await.unwrap();

    mock.assert_async().await;
}

/// Test that a hook failure reaches the logger's caller
#[tokio::test]
async fn test_logger_surfaces_push_failure() {
    let client = RecordingClient::new(StatusCode::SERVICE_UNAVAILABLE);
    let options = LokiHookOptions::new().with_http_client(client.clone());
    let mut logger = Logger::default();
    logger.add_hook(Arc::new(LokiHook::with_options("http://x", options, &[])));

    let result = logger.warn("degraded").await;
    assert!(matches!(
        result,
        Err(LokiError::Remote { status, ref body }) if status == StatusCode::SERVICE_UNAVAILABLE && body == "recorded"
    ));
    assert_eq!(client.requests.lock().await.len(), 1);
}
