//! Application error types

use authgate_domain::{DomainError, RequestContext, TokenSource};
use thiserror::Error;

use crate::ports::TransportError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The storage adapter does not implement the configured token source.
    #[error("storage backend `{actual}` does not match configured token source `{configured}`")]
    TokenSourceMismatch {
        /// Source named in the configuration.
        configured: TokenSource,
        /// Source of the injected adapter.
        actual: TokenSource,
    },
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// A failed request together with the state it was sent with.
///
/// The auth pipeline always hands this value back unchanged on failure,
/// except that `context.retried` is set once a retry has been attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} {} failed: {source}", .context.request.method, .context.request.url)]
pub struct RequestError {
    /// The request and its auth flags.
    pub context: RequestContext,
    /// What the transport reported.
    pub source: TransportError,
}

impl RequestError {
    /// Pairs a transport error with the request that produced it.
    #[must_use]
    pub const fn new(context: RequestContext, source: TransportError) -> Self {
        Self { context, source }
    }

    /// The HTTP status, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.source.status()
    }
}
