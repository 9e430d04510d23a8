//! Token storage backend selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Storage backend that holds the credentials for an interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Cookies written with `Secure` and `SameSite=Strict`.
    #[default]
    #[serde(alias = "cookies")]
    Cookie,
    /// Storage that survives process restarts.
    #[serde(rename = "local", alias = "local_persistent", alias = "localStorage")]
    LocalPersistent,
    /// Storage that lives as long as the current session.
    #[serde(
        rename = "session",
        alias = "session_persistent",
        alias = "sessionStorage"
    )]
    SessionPersistent,
}

impl TokenSource {
    /// Returns all token sources.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Cookie, Self::LocalPersistent, Self::SessionPersistent]
    }

    /// Returns the canonical name of the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cookie => "cookie",
            Self::LocalPersistent => "local",
            Self::SessionPersistent => "session",
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSource {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cookie" | "cookies" => Ok(Self::Cookie),
            "local" | "local_persistent" | "localstorage" => Ok(Self::LocalPersistent),
            "session" | "session_persistent" | "sessionstorage" => Ok(Self::SessionPersistent),
            other => Err(DomainError::UnknownTokenSource(other.to_string())),
        }
    }
}
