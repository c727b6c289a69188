//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use claimwatch::models::{AppConfig, CheckRecord};
use claimwatch::server::{build_router, create_app_state, AppState};
use claimwatch::services::ReportCache;

/// Test application with router, a private data directory and direct
/// access to the report cache
pub struct TestApp {
    router: axum::Router,
    pub reports: Arc<ReportCache>,
    data_dir: TempDir,
}

impl TestApp {
    /// Create a new test application with default settings
    pub fn new() -> Self {
        Self::with_config_yaml("")
    }

    /// Create a test application from a YAML configuration.
    /// `data_dir` is always replaced by a fresh temporary directory.
    pub fn with_config_yaml(yaml: &str) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = Self::create_state(yaml, data_dir.path());
        let reports = state.reports.clone();
        let router = build_router(state);

        Self {
            router,
            reports,
            data_dir,
        }
    }

    /// Create application state rooted at `data_dir`
    pub fn create_state(yaml: &str, data_dir: &Path) -> AppState {
        let mut config = AppConfig::from_yaml_str(yaml).expect("Invalid test configuration");
        config.data_dir = Some(data_dir.to_path_buf());
        create_app_state(Arc::new(config))
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with a PNG body
    pub async fn post_png(&self, path: &str, png: Vec<u8>) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "image/png")
            .body(Body::from(png))
            .unwrap();
        self.request(request).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Upload a screenshot and return the parsed check result
    pub async fn check(&self, map_id: &str, png: Vec<u8>) -> serde_json::Value {
        let response = self
            .post_png(&format!("/api/maps/{map_id}/check"), png)
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "check failed: {}",
            response.text()
        );
        response.json()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
