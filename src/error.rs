//! Relay Error Types
//!
//! Every failure a request can end in, and how each one is surfaced over HTTP.

use crate::api::{BusyReason, NormalizedResult};
use crate::client::{TransportError, TransportErrorKind};
use axum::http::StatusCode;
use thiserror::Error;

/// Public message for every busy classification
pub const BUSY_MESSAGE: &str = "The server is busy, try again later.";

/// Public message for connectivity failures
pub const UNREACHABLE_MESSAGE: &str = "Upstream service unreachable, try again later.";

/// Public message for unclassified upstream failures
pub const FAILURE_MESSAGE: &str = "Error fetching AI response";

/// Main error type for relay operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Configuration errors (bad URL, unparsable number, unknown policy)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Route is not in the endpoint table, or its slot is empty
    #[error("Unknown route '{0}'")]
    UnknownRoute(String),

    /// Prompt missing or empty
    #[error("Missing prompt")]
    MissingPrompt,

    /// Caller key missing or not in the registry
    #[error("Invalid API key")]
    InvalidKey,

    /// Upstream answered but signalled overload or rejection
    #[error("Upstream busy ({0})")]
    UpstreamBusy(BusyReason),

    /// Upstream could not be reached at all
    #[error("Upstream unreachable ({0})")]
    UpstreamUnreachable(TransportErrorKind),

    /// Anything the classifier could not place
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),
}

impl RelayError {
    /// HTTP status for this error.
    ///
    /// `UnknownRoute` maps to `302 Found`; the server pairs it with a
    /// redirect to `/` instead of a JSON body.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::UnknownRoute(_) => StatusCode::FOUND,
            RelayError::MissingPrompt => StatusCode::BAD_REQUEST,
            RelayError::InvalidKey => StatusCode::FORBIDDEN,
            RelayError::UpstreamBusy(_) | RelayError::UpstreamUnreachable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            RelayError::UpstreamFailure(_) | RelayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this is a classified, expected failure the caller should retry
    pub fn is_soft_failure(&self) -> bool {
        self.status_code() == StatusCode::SERVICE_UNAVAILABLE
    }

    /// The JSON envelope sent back to the caller
    pub fn to_result(&self) -> NormalizedResult {
        match self {
            RelayError::Config(msg) => {
                NormalizedResult::failure("Configuration error", Some(msg.as_str()))
            }
            RelayError::UnknownRoute(_) => NormalizedResult::failure("Unknown route", None),
            RelayError::MissingPrompt => NormalizedResult::failure("Missing prompt", None),
            RelayError::InvalidKey => NormalizedResult::failure("Invalid API key", None),
            RelayError::UpstreamBusy(_) => NormalizedResult::failure(BUSY_MESSAGE, None),
            RelayError::UpstreamUnreachable(_) => {
                NormalizedResult::failure(UNREACHABLE_MESSAGE, None)
            }
            RelayError::UpstreamFailure(details) => {
                NormalizedResult::failure(FAILURE_MESSAGE, Some(details.as_str()))
            }
        }
    }
}

impl From<TransportError> for RelayError {
    fn from(err: TransportError) -> Self {
        if err.kind.is_connectivity() {
            RelayError::UpstreamUnreachable(err.kind)
        } else {
            RelayError::UpstreamFailure(err.message)
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Config(format!("IO error: {}", err))
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RelayError::UnknownRoute("x".to_string()).status_code(),
            StatusCode::FOUND
        );
        assert_eq!(RelayError::MissingPrompt.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::InvalidKey.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            RelayError::UpstreamBusy(BusyReason::StatusFalse).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RelayError::UpstreamUnreachable(TransportErrorKind::Timeout).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RelayError::UpstreamFailure("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transport_error_conversion() {
        let unreachable: RelayError =
            TransportError::new(TransportErrorKind::DnsNotFound, "getaddrinfo ENOTFOUND").into();
        assert_eq!(
            unreachable,
            RelayError::UpstreamUnreachable(TransportErrorKind::DnsNotFound)
        );
        assert!(unreachable.is_soft_failure());

        let failure: RelayError =
            TransportError::new(TransportErrorKind::Decode, "expected value at line 1").into();
        assert_eq!(
            failure,
            RelayError::UpstreamFailure("expected value at line 1".to_string())
        );
        assert!(!failure.is_soft_failure());
    }

    #[test]
    fn test_failure_envelope_carries_details() {
        let result = RelayError::UpstreamFailure("socket hang up".to_string()).to_result();
        assert!(!result.status);
        assert_eq!(result.error.as_deref(), Some(FAILURE_MESSAGE));
        assert_eq!(result.details.as_deref(), Some("socket hang up"));

        let busy = RelayError::UpstreamBusy(BusyReason::BusyPhrase).to_result();
        assert_eq!(busy.error.as_deref(), Some(BUSY_MESSAGE));
        assert!(busy.details.is_none());
    }
}
