//! Integration tests for the climate node HTTP surface.
//!
//! Most tests drive the router in-process with `tower::ServiceExt::oneshot`.
//! The last one starts an actual server and talks HTTP/1.1 over TCP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tower::ServiceExt;

use climate_core::{ClimateSensor, Reading, ReadingSource, SensorReader};
use climate_protocol::ClimateService;
use climate_web::{create_router, shared};

const VALID_BODY: &str = r#"{"temperature":23.5,"humidity":60.1}"#;
const FAILED_BODY: &str =
    r#"{"error":"Failed to read from DHT sensor!","temperature":0.0,"humidity":0.0}"#;

/// Reading source returning a fixed value and counting reads.
#[derive(Clone)]
struct StubSource {
    reading: Reading,
    reads: Arc<AtomicUsize>,
}

impl StubSource {
    fn new(reading: Reading) -> Self {
        Self {
            reading,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ReadingSource for StubSource {
    fn read(&mut self) -> Reading {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.reading
    }
}

/// Reading source that holds the "bus" for a while and notes any overlap.
#[derive(Clone, Default)]
struct SlowSource {
    busy: Arc<AtomicBool>,
    overlapped: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
}

impl ReadingSource for SlowSource {
    fn read(&mut self) -> Reading {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        std::thread::sleep(Duration::from_millis(50));
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.busy.store(false, Ordering::SeqCst);
        Reading::measured(23.5, 60.1)
    }
}

/// Driver-level stub, for going through the real Sensor Reader.
struct NanSensor;

impl ClimateSensor for NanSensor {
    fn read_humidity(&mut self) -> f32 {
        f32::NAN
    }

    fn read_temperature(&mut self) -> f32 {
        21.0
    }
}

fn router_with(reading: Reading) -> (Router, Arc<AtomicUsize>) {
    let source = StubSource::new(reading);
    let reads = source.reads.clone();
    let router = create_router(shared(ClimateService::new("test-node", source)));
    (router, reads)
}

/// Send a request and return status, content type and body.
async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, String, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_data_valid_reading() {
    let (router, _) = router_with(Reading::measured(23.5, 60.1));

    let (status, content_type, body) = send(&router, Method::GET, "/data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    assert_eq!(body, VALID_BODY);
}

#[tokio::test]
async fn test_data_failed_reading_is_still_200() {
    let (router, _) = router_with(Reading::failed());

    let (status, content_type, body) = send(&router, Method::GET, "/data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    assert_eq!(body, FAILED_BODY);
}

#[tokio::test]
async fn test_data_failed_reading_ignores_stub_values() {
    let (router, _) = router_with(Reading {
        temperature: 31.0,
        humidity: 12.0,
        valid: false,
    });

    let (_, _, body) = send(&router, Method::GET, "/data").await;

    assert_eq!(body, FAILED_BODY);
}

#[tokio::test]
async fn test_data_through_sensor_reader() {
    let service = ClimateService::new("test-node", SensorReader::new(NanSensor));
    let router = create_router(shared(service));

    let (status, _, body) = send(&router, Method::GET, "/data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, FAILED_BODY);
}

#[tokio::test]
async fn test_data_fields_match_reading() {
    let samples = [(-10.5_f32, 30.0_f32), (0.0, 100.0), (37.8, 8.25)];
    for (temperature, humidity) in samples {
        let (router, _) = router_with(Reading::measured(temperature, humidity));

        let (_, _, body) = send(&router, Method::GET, "/data").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert!(json.get("error").is_none());
        assert_eq!(json["temperature"].as_f64().unwrap() as f32, temperature);
        assert_eq!(json["humidity"].as_f64().unwrap() as f32, humidity);
    }
}

#[tokio::test]
async fn test_repeated_data_requests_are_identical() {
    let (router, reads) = router_with(Reading::measured(23.5, 60.1));

    let (_, _, first) = send(&router, Method::GET, "/data").await;
    let (_, _, second) = send(&router, Method::GET, "/data").await;
    let (_, _, third) = send(&router, Method::GET, "/data").await;

    assert_eq!(first, second);
    assert_eq!(second, third);
    // a fresh reading per request, nothing cached
    assert_eq!(reads.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_root_does_not_read_sensor() {
    for reading in [Reading::measured(23.5, 60.1), Reading::failed()] {
        let (router, reads) = router_with(reading);

        let (status, content_type, body) = send(&router, Method::GET, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/html");
        assert!(body.contains("test-node"));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (router, reads) = router_with(Reading::measured(23.5, 60.1));

    let (status, content_type, body) = send(&router, Method::GET, "/temperature").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type, "text/plain");
    assert_eq!(body, "Not found: /temperature");
    assert_eq!(reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_path_drops_query_string() {
    let (router, reads) = router_with(Reading::measured(23.5, 60.1));

    let (status, _, body) = send(&router, Method::GET, "/data/extra?unit=f").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not found: /data/extra");
    assert_eq!(reads.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_data_requests_do_not_overlap() {
    let source = SlowSource::default();
    let router = create_router(shared(ClimateService::new("test-node", source.clone())));

    let first = tokio::spawn({
        let router = router.clone();
        async move { send(&router, Method::GET, "/data").await }
    });
    let second = tokio::spawn({
        let router = router.clone();
        async move { send(&router, Method::GET, "/data").await }
    });

    let (first, second) = tokio::join!(first, second);
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert_eq!(first.2, VALID_BODY);
    assert_eq!(second.2, VALID_BODY);
    assert_eq!(source.reads.load(Ordering::SeqCst), 2);
    assert!(!source.overlapped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_wrong_method_on_data() {
    let (router, reads) = router_with(Reading::measured(23.5, 60.1));

    let (status, _, _) = send(&router, Method::POST, "/data").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_serves_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let (router, _) = router_with(Reading::measured(23.5, 60.1));

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /data HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut raw = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("Timeout")
        .unwrap();
    let response = String::from_utf8(raw).unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("content-type: application/json\r\n"));
    assert!(response.ends_with(VALID_BODY));

    handle.abort();
}
