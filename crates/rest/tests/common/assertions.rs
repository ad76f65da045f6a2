//! HTTP response assertions.

use axum_test::TestResponse;
use serde_json::Value;

/// Asserts that the body is an OperationOutcome with the given issue code.
pub fn assert_operation_outcome(response: &TestResponse, code: &str) {
    let body: Value = response.json();
    assert_eq!(body["resourceType"], "OperationOutcome", "body: {}", body);
    assert_eq!(body["issue"][0]["code"], code, "body: {}", body);
}

/// Asserts that the body is a searchset Bundle and returns its resources.
pub fn bundle_resources(response: &TestResponse) -> Vec<Value> {
    let body: Value = response.json();
    assert_eq!(body["resourceType"], "Bundle", "body: {}", body);
    assert_eq!(body["type"], "searchset");
    let entries = body["entry"].as_array().cloned().unwrap_or_default();
    assert_eq!(body["total"].as_u64(), Some(entries.len() as u64));
    entries
        .into_iter()
        .map(|entry| entry["resource"].clone())
        .collect()
}

/// Ids of the resources in a searchset Bundle, in order.
pub fn bundle_ids(response: &TestResponse) -> Vec<String> {
    bundle_resources(response)
        .iter()
        .filter_map(|r| r["id"].as_str().map(str::to_string))
        .collect()
}

/// Asserts that the response has a Location header ending with `suffix`.
pub fn assert_location_ends_with(response: &TestResponse, suffix: &str) {
    let location = response.header("location");
    let location = location.to_str().expect("ascii location");
    assert!(
        location.ends_with(suffix),
        "Expected Location ending with {}, got {}",
        suffix,
        location
    );
}
