//! Error Payloads
//!
//! The server reports failures as JSON with an `error` field (a string or a
//! list of strings) or a `detail` field.

use serde_json::Value;

use crate::error::Error;

/// Extract the displayable message from an error body, if it has one
pub fn message_from_payload(body: &Value) -> Option<String> {
    if let Some(message) = body.get("error").and_then(flatten_message) {
        return Some(message);
    }
    body.get("detail").and_then(flatten_message)
}

fn flatten_message(value: &Value) -> Option<String> {
    let message = match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!message.trim().is_empty()).then_some(message)
}

/// Generic message when the body carries nothing usable
pub fn status_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

/// Build a transport error from a failed response's status and body
pub fn error_from_body(status: u16, body: &[u8]) -> Error {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| message_from_payload(&v))
        .unwrap_or_else(|| status_message(status));
    Error::transport(Some(status), message)
}
