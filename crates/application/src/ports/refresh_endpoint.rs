//! Refresh endpoint port

use async_trait::async_trait;
use authgate_domain::{Credential, RefreshError, RefreshGrant};

/// Remote service that exchanges a refresh credential for a new access credential.
#[async_trait]
pub trait RefreshEndpoint: Send + Sync {
    /// Calls `endpoint` with the refresh credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails at the network level, the
    /// endpoint answers with a non-success status, or the body carries no
    /// usable access token.
    async fn refresh(
        &self,
        endpoint: &str,
        refresh_token: &Credential,
    ) -> Result<RefreshGrant, RefreshError>;
}
