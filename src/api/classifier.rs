//! Response Classifier
//!
//! Turns whatever an upstream returned (or the error it failed with) into a
//! success text or a classified failure.
//!
//! Overload is signalled at three layers and each is checked in turn:
//! the outer envelope `status`, a JSON envelope re-encoded inside the
//! response text, and free-text busy phrases.

use crate::api::busy::BusyPhrases;
use crate::client::TransportError;
use crate::config::MissingStatusPolicy;
use crate::error::{RelayError, Result};
use serde_json::Value;
use std::fmt;

/// Which check classified a payload as busy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyReason {
    /// Upstream returned nothing, or JSON `null`
    NoPayload,

    /// Top-level `status` is `false`
    StatusFalse,

    /// Top-level `status` is missing and the policy rejects it
    StatusMissing,

    /// The response text is itself a failed JSON envelope
    NestedFailure,

    /// The response text matches a busy phrase
    BusyPhrase,
}

impl fmt::Display for BusyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BusyReason::NoPayload => "no payload",
            BusyReason::StatusFalse => "status false",
            BusyReason::StatusMissing => "status missing",
            BusyReason::NestedFailure => "nested failure envelope",
            BusyReason::BusyPhrase => "busy phrase",
        };
        f.write_str(name)
    }
}

/// Stateless classifier; one instance is shared by all requests
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    busy_phrases: BusyPhrases,
    missing_status: MissingStatusPolicy,
}

impl Classifier {
    /// Create a new classifier
    pub fn new(busy_phrases: BusyPhrases, missing_status: MissingStatusPolicy) -> Self {
        Self {
            busy_phrases,
            missing_status,
        }
    }

    pub fn busy_phrases(&self) -> &BusyPhrases {
        &self.busy_phrases
    }

    /// Classify the outcome of an upstream call
    pub fn classify(
        &self,
        outcome: std::result::Result<Value, TransportError>,
    ) -> Result<String> {
        match outcome {
            Ok(payload) => self.classify_payload(&payload),
            Err(err) => Err(err.into()),
        }
    }

    /// Classify a payload the upstream did return
    pub fn classify_payload(&self, payload: &Value) -> Result<String> {
        if payload.is_null() {
            return Err(RelayError::UpstreamBusy(BusyReason::NoPayload));
        }

        let extracted = extract_response(payload);

        match payload.get("status") {
            Some(Value::Bool(false)) => {
                return Err(RelayError::UpstreamBusy(BusyReason::StatusFalse));
            }
            None => {
                let reject = match self.missing_status {
                    MissingStatusPolicy::Reject => true,
                    MissingStatusPolicy::RequireResponse => extracted.is_none(),
                    MissingStatusPolicy::Allow => false,
                };
                if reject {
                    return Err(RelayError::UpstreamBusy(BusyReason::StatusMissing));
                }
            }
            Some(_) => {}
        }

        let ai_response = extracted.unwrap_or_else(|| payload.to_string());

        if nested_failure_signal(&ai_response) {
            return Err(RelayError::UpstreamBusy(BusyReason::NestedFailure));
        }

        if self.busy_phrases.matches(&ai_response) {
            return Err(RelayError::UpstreamBusy(BusyReason::BusyPhrase));
        }

        Ok(ai_response)
    }
}

/// Pull the answer text out of a payload.
///
/// Tries `result[0].response`, then `response`. Only non-empty strings count.
pub fn extract_response(payload: &Value) -> Option<String> {
    let from_result = payload
        .get("result")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|first| first.get("response"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty());

    let from_response = || {
        payload
            .get("response")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    };

    from_result.or_else(from_response).map(str::to_string)
}

/// Detect a failed envelope re-encoded inside a response string.
///
/// Some upstreams put a whole JSON envelope in the response field. The text
/// counts as a failure when it parses to an object with `status` false
/// (boolean or `"false"`), a truthy `error`, or a `message` mentioning
/// "error". Text that is not JSON is never a failure here.
pub fn nested_failure_signal(text: &str) -> bool {
    let Ok(Value::Object(inner)) = serde_json::from_str::<Value>(text) else {
        return false;
    };

    let status_false = match inner.get("status") {
        Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s == "false",
        _ => false,
    };

    let has_error = inner.get("error").is_some_and(is_truthy);

    let error_message = inner
        .get("message")
        .and_then(Value::as_str)
        .is_some_and(|message| message.to_lowercase().contains("error"));

    status_false || has_error || error_message
}

/// JavaScript-style truthiness
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
