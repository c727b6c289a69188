//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is a valid PNG image
pub fn assert_png(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_png(),
        "Expected PNG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..8.min(response.body.len())]
    );
    assert_eq!(
        response.header("content-type"),
        Some("image/png"),
        "Expected Content-Type: image/png"
    );
}

/// Assert an error response carries the status both in HTTP and in the JSON body
pub fn assert_json_error(response: &TestResponse, expected: StatusCode) {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(expected.as_u16() as u64),
        "Expected JSON status {}, got {:?}. Full response: {}",
        expected.as_u16(),
        json["status"],
        serde_json::to_string_pretty(&json).unwrap()
    );
    assert!(json["error"].is_string(), "Expected error message");
}

/// Assert a check result has the expected outcome and change count
pub fn assert_check(result: &serde_json::Value, outcome: &str, num_changes: u64) {
    assert_eq!(
        result["outcome"], outcome,
        "Unexpected outcome in {}",
        serde_json::to_string_pretty(result).unwrap()
    );
    assert_eq!(result["num_changes"].as_u64(), Some(num_changes));
    assert_eq!(result["changes_detected"].as_bool(), Some(num_changes > 0));
}
