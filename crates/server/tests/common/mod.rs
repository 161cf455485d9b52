//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, so the control API can be exercised
//! without a media library, network or disk.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use artdump_core::{
    testing::{MockLibrary, MockPlacer, MockTransport},
    ArtworkProcessor, ArtworkService, Config, MediaType, SqliteProcessedStore, TracingProgress,
};
use artdump_server::state::AppState;

/// Re-export fixtures for test convenience
pub use artdump_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// The service loop is not spawned, so requested runs stay pending and the
/// status endpoint is deterministic. Single-item runs execute inline.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_start_run() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/runs", json!({ "scope": "videos" })).await;
///
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock library - seed items and inspect art updates
    pub library: Arc<MockLibrary>,
    /// Mock transport - configure artwork responses
    pub transport: Arc<MockTransport>,
    /// Mock placer - inspect written files
    pub placer: Arc<MockPlacer>,
    pub service: Arc<ArtworkService>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with the default config.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    /// Create a test fixture with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let library = Arc::new(MockLibrary::new());
        let transport = Arc::new(MockTransport::new());
        let placer = Arc::new(MockPlacer::new());
        let processed = Arc::new(
            SqliteProcessedStore::in_memory().expect("Failed to create processed store"),
        );
        let progress = Arc::new(TracingProgress::new());

        let processor = ArtworkProcessor::new(
            &config,
            library.clone(),
            transport.clone(),
            placer.clone(),
            processed,
            progress.clone(),
        )
        .expect("Failed to create processor")
        .with_throttle(Duration::ZERO)
        .with_linger(Duration::ZERO);
        let service = Arc::new(ArtworkService::new(
            Arc::new(processor),
            config.service.clone(),
        ));

        let state = Arc::new(AppState::new(config, Arc::clone(&service), progress));
        let router = artdump_server::api::create_router(state);

        Self {
            router,
            library,
            transport,
            placer,
            service,
        }
    }

    /// Seed a movie whose poster and fanart are both downloadable.
    pub async fn add_movie(&self, dbid: i64, title: &str) {
        let slug = title.to_lowercase().replace(' ', "-");
        for art_type in ["poster", "fanart"] {
            let url = format!("https://img.example/{}/{}.jpg", slug, art_type);
            self.transport.set_image(&url, "image/jpeg", b"img").await;
        }
        self.library
            .add_item(
                MediaType::Movie,
                fixtures::movie_record(dbid, title, &format!("/movies/{}/{}.mkv", title, title)),
            )
            .await;
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a plain text body, such as the metrics exposition.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
