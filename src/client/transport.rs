//! Transport Errors
//!
//! Failures of the upstream call itself, sorted into connectivity classes.

use std::error::Error as StdError;
use std::fmt;

/// Class of a failed upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Request or connect timeout elapsed (`ETIMEDOUT`)
    Timeout,

    /// Connection refused or not established (`ECONNREFUSED`)
    ConnectionRefused,

    /// Host name does not resolve (`ENOTFOUND`)
    DnsNotFound,

    /// Temporary resolver failure (`EAI_AGAIN`)
    DnsRetry,

    /// Body unreadable or not JSON
    Decode,

    /// Anything else
    Other,
}

impl TransportErrorKind {
    /// Map a Node/libc style error code
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "ETIMEDOUT" | "ESOCKETTIMEDOUT" => TransportErrorKind::Timeout,
            "ECONNREFUSED" => TransportErrorKind::ConnectionRefused,
            "ENOTFOUND" => TransportErrorKind::DnsNotFound,
            "EAI_AGAIN" => TransportErrorKind::DnsRetry,
            _ => TransportErrorKind::Other,
        }
    }

    /// Guess the kind from an error description, if it names a known class
    pub fn from_message(message: &str) -> Option<Self> {
        let message = message.to_lowercase();

        if message.contains("eai_again") || message.contains("temporary failure in name resolution")
        {
            Some(TransportErrorKind::DnsRetry)
        } else if message.contains("enotfound")
            || message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
        {
            Some(TransportErrorKind::DnsNotFound)
        } else if message.contains("econnrefused") || message.contains("connection refused") {
            Some(TransportErrorKind::ConnectionRefused)
        } else if message.contains("etimedout") || message.contains("timed out") {
            Some(TransportErrorKind::Timeout)
        } else {
            None
        }
    }

    /// Whether the upstream simply could not be reached
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            TransportErrorKind::Timeout
                | TransportErrorKind::ConnectionRefused
                | TransportErrorKind::DnsNotFound
                | TransportErrorKind::DnsRetry
        )
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::ConnectionRefused => "connection refused",
            TransportErrorKind::DnsNotFound => "dns not found",
            TransportErrorKind::DnsRetry => "dns retry",
            TransportErrorKind::Decode => "decode",
            TransportErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A failed upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,

    /// Raw description, returned to callers as `details` on 500s
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the upstream secret
        let err = err.without_url();
        let message = error_chain(&err);

        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_decode() || err.is_body() {
            TransportErrorKind::Decode
        } else if err.is_connect() {
            TransportErrorKind::from_message(&message)
                .unwrap_or(TransportErrorKind::ConnectionRefused)
        } else {
            TransportErrorKind::from_message(&message).unwrap_or(TransportErrorKind::Other)
        };

        Self { kind, message }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::new(
            TransportErrorKind::Decode,
            format!("invalid JSON response body: {}", err),
        )
    }
}

/// Render an error and all of its sources as one line
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
