//! Opaque credential values

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque access or refresh token.
///
/// The value is never parsed; it is forwarded verbatim in headers and
/// request bodies. `Debug` only prints a short preview so credentials do
/// not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consumes the credential and returns the raw token value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns a preview of the token (first 8 chars + ...).
    ///
    /// Short tokens are fully masked.
    #[must_use]
    pub fn preview(&self) -> String {
        if self.0.chars().count() > 12 {
            let head: String = self.0.chars().take(8).collect();
            format!("{head}...")
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.preview()).finish()
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which of the two stored credentials a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Short-lived bearer token attached to ordinary requests.
    Access,
    /// Longer-lived token exchanged for a new access token.
    Refresh,
}
