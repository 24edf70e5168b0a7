//! End-to-end tests: a live backend behind the proxy, routed by Host.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

use wakeward::config::model::{Defaults, FileConfig, RawService};
use wakeward::config::registry::build_registry;
use wakeward::server::{self, AppState};
use wakeward::wake::WolNotifier;

#[derive(Default)]
struct BackendState {
    health_calls: AtomicUsize,
    /// Number of initial health probes that answer 503 before recovering.
    fail_first: usize,
}

async fn health(State(state): State<Arc<BackendState>>) -> StatusCode {
    let call = state.health_calls.fetch_add(1, Ordering::SeqCst);
    if call < state.fail_first {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

async fn search(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn echo(headers: HeaderMap, body: Bytes) -> axum::Json<serde_json::Value> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    axum::Json(serde_json::json!({
        "host": get("host"),
        "content_type": get("content-type"),
        "x_custom": get("x-custom"),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn big() -> Vec<u8> {
    vec![0x5A; 256 * 1024]
}

async fn decorated() -> ([(&'static str, &'static str); 2], &'static str) {
    (
        [("x-backend", "wakeward-test"), ("content-encoding", "identity")],
        "OK",
    )
}

/// Start a mock backend; `fail_first` health probes answer 503.
async fn start_backend(fail_first: usize) -> (SocketAddr, Arc<BackendState>) {
    let state = Arc::new(BackendState {
        health_calls: AtomicUsize::new(0),
        fail_first,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/echo", get(echo).post(echo))
        .route("/big", get(big))
        .route("/decorated", get(decorated))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// UDP sink that counts received wake packets.
async fn start_wake_sink() -> (SocketAddr, Arc<AtomicUsize>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = count.clone();
    tokio::spawn(async move {
        let mut buf = [0u8; 256];
        while socket.recv_from(&mut buf).await.is_ok() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    (addr, count)
}

struct TestProxy {
    addr: SocketAddr,
    wake_count: Arc<AtomicUsize>,
    _shutdown: tokio::sync::oneshot::Sender<()>,
}

/// Start the proxy with the given `(host, base_url, max_retries)` services.
async fn start_proxy(services: &[(&str, String, u32)]) -> TestProxy {
    let (wake_addr, wake_count) = start_wake_sink().await;

    let config = FileConfig {
        defaults: Defaults::default(),
        services: services
            .iter()
            .map(|(host, base_url, max_retries)| {
                (
                    (*host).to_string(),
                    RawService {
                        base_url: Some(base_url.clone()),
                        health_check_path: Some("/health".into()),
                        mac_address: Some("00:11:22:33:44:55".into()),
                        max_retries: Some(*max_retries),
                        poll_interval: Some(0),
                        probe_timeout: Some(1),
                        forward_timeout: Some(5),
                    },
                )
            })
            .collect(),
    };

    let registry = build_registry(&config);
    let state = Arc::new(AppState::with_notifier(
        Arc::new(registry),
        WolNotifier::with_target(wake_addr),
    ));
    let router = server::build_router(state, 1_048_576);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    TestProxy {
        addr,
        wake_count,
        _shutdown: shutdown_tx,
    }
}

/// Raw HTTP backend that answers `/health` with an empty 200 and any
/// other path with an endless body, setting the flag once its writes
/// start failing because the peer went away.
async fn start_streaming_backend() -> (SocketAddr, Arc<AtomicBool>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let disconnected = Arc::new(AtomicBool::new(false));

    let flag = disconnected.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(serve_streaming_connection(stream, flag.clone()));
        }
    });

    (addr, disconnected)
}

async fn serve_streaming_connection(mut stream: TcpStream, disconnected: Arc<AtomicBool>) {
    let mut buf = [0u8; 4096];
    loop {
        // One request's headers, allowing for connection reuse after /health.
        let mut request = Vec::new();
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        if request.starts_with(b"GET /health") {
            if stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                .await
                .is_err()
            {
                return;
            }
            continue;
        }

        let header = format!("HTTP/1.1 200 OK\r\ncontent-length: {}\r\n\r\n", 1u64 << 30);
        if stream.write_all(header.as_bytes()).await.is_err() {
            return;
        }
        let chunk = [0x42u8; 8192];
        loop {
            if stream.write_all(&chunk).await.is_err() {
                disconnected.store(true, Ordering::SeqCst);
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

/// A TCP port with nothing listening on it.
async fn dead_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn missing_host_header_returns_400() {
    let (backend, _) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    // HTTP/1.0 is the only way to get a request without a Host header
    // past a real client.
    let mut stream = TcpStream::connect(proxy.addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.0\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    let status_line = response.lines().next().unwrap_or_default();
    assert!(status_line.contains(" 400 "), "got: {status_line}");
    assert!(response.ends_with("Host header is missing."), "got: {response}");
}

#[tokio::test]
async fn unknown_host_returns_404_with_exact_body() {
    let (backend, _) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/anything", proxy.addr))
        .header(reqwest::header::HOST, "stranger.test")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert_eq!(
        resp.text().await.unwrap(),
        "Unknown target service: stranger.test."
    );
}

#[tokio::test]
async fn host_matching_is_case_insensitive_on_input() {
    let (backend, _) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/api/search", proxy.addr))
        .header(reqwest::header::HOST, "SVC.Test")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn awake_backend_is_forwarded_without_waking() {
    let (backend, backend_state) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 5)]).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/api/search?q=test&limit=10", proxy.addr))
        .header(reqwest::header::HOST, "svc.test")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    // Query string arrives verbatim at the backend.
    assert_eq!(resp.text().await.unwrap(), "q=test&limit=10");
    // Exactly one probe, no wake packets.
    assert_eq!(backend_state.health_calls.load(Ordering::SeqCst), 1);
    assert_eq!(proxy.wake_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sleeping_backend_is_woken_then_forwarded() {
    // First health probe answers 503, second answers 200.
    let (backend, backend_state) = start_backend(1).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/decorated", proxy.addr))
        .header(reqwest::header::HOST, "svc.test")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
    assert_eq!(backend_state.health_calls.load(Ordering::SeqCst), 2);

    // The wake packet is sent before the successful re-probe, so it has
    // already hit the local sink by now.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(proxy.wake_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_backend_exhausts_retries_with_exact_body() {
    let dead = dead_port().await;
    let proxy = start_proxy(&[("down.test", format!("http://127.0.0.1:{dead}"), 2)]).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/", proxy.addr))
        .header(reqwest::header::HOST, "down.test")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 503);
    assert_eq!(
        resp.text().await.unwrap(),
        "Failed to reach the server down.test after 2 attempts."
    );

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(proxy.wake_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn forwarded_request_strips_host_and_keeps_other_headers() {
    let (backend, _) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/echo", proxy.addr))
        .header(reqwest::header::HOST, "svc.test")
        .header("content-type", "application/json")
        .header("x-custom", "preserved")
        .body(r#"{"ping":true}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let seen: serde_json::Value = resp.json().await.unwrap();

    // The transport sets its own Host for the backend hop.
    assert_eq!(seen["host"], backend.to_string());
    assert_eq!(seen["content_type"], "application/json");
    assert_eq!(seen["x_custom"], "preserved");
    assert_eq!(seen["body"], r#"{"ping":true}"#);
}

#[tokio::test]
async fn transport_owned_response_headers_are_not_relayed() {
    let (backend, _) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/decorated", proxy.addr))
        .header(reqwest::header::HOST, "svc.test")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("x-backend").unwrap(), "wakeward-test");
    assert!(resp.headers().get("content-encoding").is_none());
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn non_utf8_host_is_treated_as_unknown_service() {
    let (backend, _) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    // 0xE9 is valid in a header value but not valid UTF-8.
    let mut stream = TcpStream::connect(proxy.addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nhost: caf\xe9.test\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);

    let status_line = response.lines().next().unwrap_or_default();
    assert!(status_line.contains(" 404 "), "got: {status_line}");
    assert!(
        response.ends_with("Unknown target service: caf\u{FFFD}.test."),
        "got: {response}"
    );
}

#[tokio::test]
async fn client_disconnect_releases_backend_stream() {
    let (backend, backend_saw_disconnect) = start_streaming_backend().await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    let mut stream = TcpStream::connect(proxy.addr).await.unwrap();
    stream
        .write_all(b"GET /stream HTTP/1.1\r\nhost: svc.test\r\n\r\n")
        .await
        .unwrap();

    // Read some of the streamed body, then hang up mid-stream.
    let mut received = 0usize;
    let mut buf = [0u8; 4096];
    while received < 16 * 1024 {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "stream ended before the disconnect");
        received += n;
    }
    drop(stream);

    // The relay must stop reading from the backend, whose writes then fail.
    let mut observed = false;
    for _ in 0..500 {
        if backend_saw_disconnect.load(Ordering::SeqCst) {
            observed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(observed, "backend never observed the disconnect");
}

#[tokio::test]
async fn large_response_body_is_relayed_intact() {
    let (backend, _) = start_backend(0).await;
    let proxy = start_proxy(&[("svc.test", format!("http://{backend}"), 1)]).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/big", proxy.addr))
        .header(reqwest::header::HOST, "svc.test")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body = resp.bytes().await.unwrap();
    assert_eq!(body.len(), 256 * 1024);
    assert!(body.iter().all(|b| *b == 0x5A));
}
