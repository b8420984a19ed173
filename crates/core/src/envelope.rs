//! Wire envelope shared by every content endpoint.
//!
//! Success: `{ "success": true, "data": ... }`
//! Failure: `{ "success": false, "message": "..." }`

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The uniform response shape returned by content endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self { success: true, data: Some(data), message: None }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: Some(message.into()) }
    }
}

/// Extract the payload from a response body.
///
/// Two conventions are accepted. When the body is an object carrying a
/// `success` field it is treated as an envelope: `data` is returned on
/// success (null when absent) and `message` becomes the error otherwise.
/// Any other body is the payload itself.
///
/// # Errors
///
/// Returns the envelope's failure message when `success` is false.
pub fn unwrap_payload(body: Value) -> Result<Value, String> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };

    let Some(success) = map.get("success") else {
        return Ok(Value::Object(map));
    };

    if success.as_bool().unwrap_or(false) {
        Ok(map.remove("data").unwrap_or(Value::Null))
    } else {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "request failed".to_string());
        Err(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_serialization() {
        let ok = serde_json::to_value(Envelope::ok(json!({"a": 1}))).unwrap();
        assert_eq!(ok, json!({"success": true, "data": {"a": 1}}));

        let fail = serde_json::to_value(Envelope::fail("nope")).unwrap();
        assert_eq!(fail, json!({"success": false, "message": "nope"}));
    }

    #[test]
    fn test_unwrap_success_envelope() {
        let body = json!({"success": true, "data": ["a", "b"]});
        assert_eq!(unwrap_payload(body).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_unwrap_success_without_data() {
        assert_eq!(unwrap_payload(json!({"success": true})).unwrap(), Value::Null);
    }

    #[test]
    fn test_unwrap_failure_envelope() {
        let body = json!({"success": false, "message": "not found"});
        assert_eq!(unwrap_payload(body).unwrap_err(), "not found");

        let body = json!({"success": false});
        assert_eq!(unwrap_payload(body).unwrap_err(), "request failed");
    }

    #[test]
    fn test_unwrap_bare_payload() {
        let body = json!({"title": "About", "body": "..."});
        assert_eq!(unwrap_payload(body.clone()).unwrap(), body);
        assert_eq!(unwrap_payload(json!("plain")).unwrap(), json!("plain"));
    }
}
