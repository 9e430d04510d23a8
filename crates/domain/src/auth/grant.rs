//! Refresh endpoint response handling

use serde_json::Value;
use thiserror::Error;

use super::Credential;

/// Credentials returned by a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshGrant {
    /// The new access credential.
    pub access_token: Credential,
    /// A rotated refresh credential, if the endpoint issued one.
    pub refresh_token: Option<Credential>,
}

impl RefreshGrant {
    /// Creates a grant with only an access credential.
    #[must_use]
    pub fn new(access_token: impl Into<Credential>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    /// Adds a rotated refresh credential.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<Credential>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Parses a refresh endpoint response body.
    ///
    /// `access_token` must be a JSON string; anything else (missing, null,
    /// a number) is rejected. A non-string `refresh_token` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `MalformedBody` if the body is not JSON and
    /// `MissingAccessToken` if no usable access token is present.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, RefreshError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RefreshError::MalformedBody(e.to_string()))?;

        let Some(access_token) = value.get("access_token").and_then(Value::as_str) else {
            return Err(RefreshError::MissingAccessToken);
        };

        let refresh_token = value
            .get("refresh_token")
            .and_then(Value::as_str)
            .map(Credential::from);

        Ok(Self {
            access_token: Credential::from(access_token),
            refresh_token,
        })
    }
}

/// Reasons a refresh call produced no usable credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The request never produced a response.
    #[error("refresh request failed: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("refresh endpoint returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The body was not valid JSON.
    #[error("refresh response is not valid JSON: {0}")]
    MalformedBody(String),

    /// The body had no string `access_token`.
    #[error("refresh response has no usable access_token")]
    MissingAccessToken,

    /// Another caller's refresh, which this one was waiting on, failed.
    #[error("shared refresh attempt failed")]
    Coalesced,
}
