//! Refresh endpoint client using reqwest.
//!
//! Calls the endpoint directly, outside the authenticated pipeline, so a
//! failing refresh can never trigger another refresh.

use std::time::Duration;

use async_trait::async_trait;
use authgate_application::ports::RefreshEndpoint;
use authgate_domain::{Credential, RefreshError, RefreshGrant};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Time allowed for one refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Refresh endpoint reached over HTTP.
///
/// Sends `POST <endpoint>` with `{"refresh_token": "..."}` and reads
/// `access_token` and an optional rotated `refresh_token` from the reply.
#[derive(Debug, Clone)]
pub struct ReqwestRefreshEndpoint {
    client: Client,
    timeout: Duration,
}

impl ReqwestRefreshEndpoint {
    /// Creates an endpoint client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, RefreshError> {
        let client = Client::builder()
            .user_agent(concat!("authgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        Ok(Self::with_client(client))
    }

    /// Creates an endpoint client over a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl RefreshEndpoint for ReqwestRefreshEndpoint {
    async fn refresh(
        &self,
        endpoint: &str,
        refresh_token: &Credential,
    ) -> Result<RefreshGrant, RefreshError> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .timeout(self.timeout)
            .json(&RefreshRequest {
                refresh_token: refresh_token.expose(),
            })
            .send()
            .await
            .map_err(|e: reqwest::Error| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(endpoint, status = status.as_u16(), "refresh endpoint rejected the call");
            return Err(RefreshError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e: reqwest::Error| RefreshError::Network(format!("failed to read body: {e}")))?;

        RefreshGrant::from_json_slice(&body)
    }
}
