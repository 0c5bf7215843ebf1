//! Error types for fetching, refreshing and validating.

use thiserror::Error;

use crate::settings::Endpoint;

/// Errors that can occur when fetching a single endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection could not be established or was dropped.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Endpoint answered with a non-success status.
    #[error("Endpoint returned status {0}")]
    Status(u16),

    /// Endpoint answered with something other than JSON.
    #[error("Endpoint returned non-JSON content (content type: {0})")]
    ContentType(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or timeout.
    Connection,
    /// Non-success status or wrong content type.
    Protocol,
    /// Malformed or unexpected body.
    Parse,
}

impl FetchError {
    /// Returns the class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Connection(_) | FetchError::Timeout => ErrorKind::Connection,
            FetchError::Status(_) | FetchError::ContentType(_) => ErrorKind::Protocol,
            FetchError::Parse(_) => ErrorKind::Parse,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() || err.is_body() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}

/// A refresh cycle was aborted. No partial metrics were published.
#[derive(Debug, Error)]
#[error("Error fetching {endpoint} data: {source}")]
pub struct UpdateFailed {
    /// The endpoint whose fetch failed first.
    pub endpoint: Endpoint,
    /// What went wrong.
    #[source]
    pub source: FetchError,
}

impl UpdateFailed {
    pub fn new(endpoint: Endpoint, source: FetchError) -> Self {
        Self { endpoint, source }
    }
}

/// Settings were rejected at setup time.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A setting has an unusable value.
    #[error("Invalid {field}: {reason}")]
    InvalidSetting {
        field: &'static str,
        reason: String,
    },

    /// The trial fetch against an endpoint failed.
    #[error("Cannot use {endpoint} URL: {source}")]
    Unreachable {
        endpoint: Endpoint,
        #[source]
        source: FetchError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(FetchError::Timeout.kind(), ErrorKind::Connection);
        assert_eq!(
            FetchError::Connection("refused".to_string()).kind(),
            ErrorKind::Connection
        );
        assert_eq!(FetchError::Status(500).kind(), ErrorKind::Protocol);
        assert_eq!(
            FetchError::ContentType("text/html".to_string()).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(FetchError::Parse("eof".to_string()).kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_update_failed_message() {
        let err = UpdateFailed::new(Endpoint::GlobalHeight, FetchError::Status(500));
        assert_eq!(
            err.to_string(),
            "Error fetching global height data: Endpoint returned status 500"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::Unreachable {
            endpoint: Endpoint::Price,
            source: FetchError::Timeout,
        };
        assert_eq!(err.to_string(), "Cannot use price URL: Request timed out");
    }
}
