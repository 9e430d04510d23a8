//! Per-request state carried through the auth pipeline

use serde::{Deserialize, Serialize};

use super::RequestSpec;

/// A request plus the flags the auth interceptor reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The request as the caller built it.
    pub request: RequestSpec,
    /// Caller opt-out: no credential is attached.
    #[serde(default)]
    pub skip_auth: bool,
    /// Set once a refresh-and-retry cycle has run for this request.
    #[serde(default)]
    pub retried: bool,
}

impl RequestContext {
    /// Wraps a request with both flags cleared.
    #[must_use]
    pub const fn new(request: RequestSpec) -> Self {
        Self {
            request,
            skip_auth: false,
            retried: false,
        }
    }

    /// Marks the request as not needing a credential.
    #[must_use]
    pub const fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Marks the retry gate.
    #[must_use]
    pub const fn retried(mut self) -> Self {
        self.retried = true;
        self
    }
}

impl From<RequestSpec> for RequestContext {
    fn from(request: RequestSpec) -> Self {
        Self::new(request)
    }
}
