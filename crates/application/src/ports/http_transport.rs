//! HTTP transport port

use std::sync::Arc;

use async_trait::async_trait;
use authgate_domain::{RequestSpec, ResponseSpec};
use thiserror::Error;

/// Errors produced by a transport.
///
/// Non-success statuses are errors too and carry the full response, so
/// callers can inspect the status the way they would a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("server responded with HTTP {}", .response.status)]
    Status {
        /// The rejected response.
        response: ResponseSpec,
    },

    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Host name resolution failed.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// The peer refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// Any other connection failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was hit.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The request body was rejected before sending.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// The response attached to a status error.
    #[must_use]
    pub const fn response(&self) -> Option<&ResponseSpec> {
        match self {
            Self::Status { response } => Some(response),
            _ => None,
        }
    }

    /// The HTTP status, if the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self.response() {
            Some(response) => Some(response.status),
            None => None,
        }
    }

    /// Returns true for an HTTP 401 response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error for non-success statuses and for network,
    /// timeout, or other HTTP-related problems.
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError> {
        (**self).execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_accessors() {
        let error = TransportError::Status {
            response: ResponseSpec::new(401, "expired"),
        };
        assert_eq!(error.status(), Some(401));
        assert!(error.is_unauthorized());
        assert_eq!(error.to_string(), "server responded with HTTP 401");

        let error = TransportError::Timeout { timeout_ms: 50 };
        assert_eq!(error.status(), None);
        assert!(!error.is_unauthorized());
    }
}
