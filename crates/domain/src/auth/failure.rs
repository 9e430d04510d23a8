//! Application-wide authentication failure signal

use std::fmt;

use serde::{Deserialize, Serialize};

/// Event type name of the failure signal.
pub const AUTH_FAILURE_EVENT: &str = "auth:failure";

/// Why stored credentials were torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailureReason {
    /// A refresh succeeded but the retried request still failed.
    TokenRefreshFailed,
}

impl AuthFailureReason {
    /// Returns the wire name of the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TokenRefreshFailed => "token_refresh_failed",
        }
    }
}

impl fmt::Display for AuthFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload delivered to failure handlers, typically to force a re-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
    /// Failure reason.
    pub reason: AuthFailureReason,
}

impl AuthFailure {
    /// Failure raised after a refreshed request was rejected again.
    #[must_use]
    pub const fn token_refresh_failed() -> Self {
        Self {
            reason: AuthFailureReason::TokenRefreshFailed,
        }
    }

    /// Returns the event type name (`auth:failure`).
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        AUTH_FAILURE_EVENT
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reason_wire_name() {
        let failure = AuthFailure::token_refresh_failed();
        assert_eq!(failure.event_type(), "auth:failure");
        assert_eq!(failure.reason.to_string(), "token_refresh_failed");
        assert_eq!(
            serde_json::to_string(&failure).unwrap(),
            r#"{"reason":"token_refresh_failed"}"#
        );
    }
}
