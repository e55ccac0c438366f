//! Shared HTTP utilities for the survey backend workspace.
//!
//! Provides the common `{success, ...}` JSON envelope builders used by the
//! api-server handlers and their tests. Framework-agnostic.

// ============================================================================
// JSON Response Helpers
// ============================================================================

/// Success envelope with a message.
///
/// Returns: `{"success": true, "message": "<message>"}`
pub fn json_ok(message: &str) -> serde_json::Value {
    serde_json::json!({"success": true, "message": message})
}

/// Failure envelope with a message.
///
/// Returns: `{"success": false, "message": "<message>"}`
pub fn json_fail(message: &str) -> serde_json::Value {
    serde_json::json!({"success": false, "message": message})
}

/// Success envelope carrying an arbitrary extra field instead of a message,
/// e.g. `json_ok_with("responses", ...)` or `json_ok_with("submitted", ...)`.
pub fn json_ok_with(key: &str, value: serde_json::Value) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert("success".to_string(), serde_json::Value::Bool(true));
    map.insert(key.to_string(), value);
    serde_json::Value::Object(map)
}
