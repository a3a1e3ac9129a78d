//! Shared fixtures for the OCR client integration tests

use ocr_client::ClientConfig;
use serde_json::{json, Value};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MIB: u64 = 1024 * 1024;

pub const HEALTH_PATH: &str = "/api/health";
pub const UPLOAD_PATH: &str = "/api/ocr/upload";
pub const INFO_PATH: &str = "/api/ocr/info";

/// Config pointing at a mock server with the default 60s timeout
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri()).expect("mock server URI is valid")
}

pub fn config_with_timeout(server: &MockServer, timeout: Duration) -> ClientConfig {
    ClientConfig::builder()
        .base_url(server.uri())
        .timeout(timeout)
        .build()
        .expect("mock server URI is valid")
}

/// Write a file of exactly `size` bytes (sparse where the OS allows)
pub fn write_image(dir: &Path, name: &str, size: u64) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("create test image");
    file.set_len(size).expect("size test image");
    path
}

/// Three blocks with confidences 0.95, 0.60, 0.99 in the backend's flat shape
pub fn receipt_body() -> Value {
    json!({
        "success": true,
        "image_info": {"width": 1240, "height": 1754},
        "total_text_regions": 3,
        "total_text": "ACME STORE\nTotal: 12.50\nThank you!",
        "ocr_results": [
            {
                "id": 1,
                "text": "ACME STORE",
                "confidence": 0.95,
                "position": {"x_min": 120.0, "y_min": 80.5, "x_max": 620.0, "y_max": 140.25},
                "dimensions": {"width": 500.0, "height": 59.75}
            },
            {
                "id": 2,
                "text": "Total: 12.50",
                "confidence": 0.60,
                "position": {"x_min": 130.0, "y_min": 900.0, "x_max": 480.0, "y_max": 950.0},
                "dimensions": {"width": 350.0, "height": 50.0}
            },
            {
                "id": 3,
                "text": "Thank you!",
                "confidence": 0.99,
                "position": {"x_min": 300.0, "y_min": 1500.0, "x_max": 700.0, "y_max": 1560.0},
                "dimensions": {"width": 400.0, "height": 60.0}
            }
        ]
    })
}

/// The documented `{success, data}` envelope around `receipt_body`
pub fn enveloped_receipt_body() -> Value {
    let mut data = receipt_body();
    if let Some(object) = data.as_object_mut() {
        object.remove("success");
        object.insert("processing_time".to_string(), json!(1.37));
    }
    json!({"success": true, "data": data})
}

pub async fn mount_healthy(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "service": "OCR Backend",
            "ocr_initialized": true
        })))
        .mount(server)
        .await;
}

pub async fn mount_upload(server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Base URL of a loopback port nothing listens on
pub fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{addr}")
}
