//! Normalized Response
//!
//! The single JSON shape every relayed request answers with.

use serde::{Deserialize, Serialize};

/// One entry of a successful result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseItem {
    /// Text produced by the upstream model
    pub response: String,
}

/// Uniform response envelope
///
/// `status == true` always comes with a non-empty `result`;
/// `status == false` always comes with an `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub status: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<ResponseItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl NormalizedResult {
    /// Successful envelope wrapping one response
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            status: true,
            result: Some(vec![ResponseItem {
                response: response.into(),
            }]),
            error: None,
            details: None,
        }
    }

    /// Failed envelope with a public message and optional details
    pub fn failure(error: impl Into<String>, details: Option<&str>) -> Self {
        Self {
            status: false,
            result: None,
            error: Some(error.into()),
            details: details.map(str::to_string),
        }
    }

    /// First response text, if this is a success
    pub fn response(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|items| items.first())
            .map(|item| item.response.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_serialization() {
        let value = serde_json::to_value(NormalizedResult::success("hello")).unwrap();
        assert_eq!(
            value,
            json!({"status": true, "result": [{"response": "hello"}]})
        );
    }

    #[test]
    fn test_failure_omits_absent_fields() {
        let value = serde_json::to_value(NormalizedResult::failure("Missing prompt", None)).unwrap();
        assert_eq!(value, json!({"status": false, "error": "Missing prompt"}));

        let value =
            serde_json::to_value(NormalizedResult::failure("Error", Some("timed out"))).unwrap();
        assert_eq!(
            value,
            json!({"status": false, "error": "Error", "details": "timed out"})
        );
    }

    #[test]
    fn test_response_accessor() {
        assert_eq!(NormalizedResult::success("x").response(), Some("x"));
        assert_eq!(NormalizedResult::failure("e", None).response(), None);
    }
}
