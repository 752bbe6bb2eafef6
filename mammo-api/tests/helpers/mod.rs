//! Shared helpers for mammo-api integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use mammo_api::models::{Classification, ModelInfo};
use mammo_api::services::{Classifier, ClassifierError, MockClassifier};
use mammo_api::{build_router, AppState};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

const BOUNDARY: &str = "mammo-test-boundary";

/// Classifier that always fails
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn classify(&self, _file_path: &Path) -> Result<Classification, ClassifierError> {
        Err(ClassifierError::Inference("model crashed".to_string()))
    }

    fn model_info(&self) -> Result<ModelInfo, ClassifierError> {
        Err(ClassifierError::Unavailable("model not loaded".to_string()))
    }
}

/// App state over an in-memory database and a temporary upload directory
///
/// The TempDir must outlive the test.
pub async fn test_state_with(classifier: Arc<dyn Classifier>, max_upload_bytes: u64) -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let pool = mammo_api::db::init_memory_database().await.unwrap();
    let state = AppState::new(pool, classifier, dir.path().join("uploads"), max_upload_bytes);
    (dir, state)
}

pub async fn test_state() -> (TempDir, AppState) {
    test_state_with(Arc::new(MockClassifier::seeded(2024)), TEST_MAX_UPLOAD_BYTES).await
}

pub async fn test_app() -> (TempDir, AppState, Router) {
    let (dir, state) = test_state().await;
    let app = build_router(state.clone());
    (dir, state, app)
}

/// Build a multipart/form-data upload with a single `file` part
pub fn upload_request(filename: &str, content_type: Option<&str>, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            BOUNDARY, filename
        )
        .as_bytes(),
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Ten bytes of PNG signature and padding
pub fn tiny_png() -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00]
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
