//! Credential store bound to configured keys and write policies.
//!
//! Wraps a [`TokenStorage`] adapter so callers work with access and
//! refresh credentials instead of raw keys.

use std::sync::Arc;

use authgate_domain::{
    Credential, CredentialKind, InterceptorConfig, RefreshGrant, StoragePolicy, TokenSource,
};
use tracing::debug;

use crate::ports::TokenStorage;

/// Shared handle to the credentials of one interceptor.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
    token_key: String,
    refresh_token_key: String,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("source", &self.storage.source())
            .field("token_key", &self.token_key)
            .field("refresh_token_key", &self.refresh_token_key)
            .finish()
    }
}

impl TokenStore {
    /// Binds a storage adapter to the keys named in `config`.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>, config: &InterceptorConfig) -> Self {
        Self {
            storage,
            token_key: config.token_key.clone(),
            refresh_token_key: config.refresh_token_key.clone(),
        }
    }

    /// The backend behind this store.
    #[must_use]
    pub fn source(&self) -> TokenSource {
        self.storage.source()
    }

    fn key(&self, kind: CredentialKind) -> &str {
        match kind {
            CredentialKind::Access => &self.token_key,
            CredentialKind::Refresh => &self.refresh_token_key,
        }
    }

    const fn policy(kind: CredentialKind) -> StoragePolicy {
        match kind {
            CredentialKind::Access => StoragePolicy::access(),
            CredentialKind::Refresh => StoragePolicy::refresh(),
        }
    }

    /// Reads a credential.
    pub async fn get(&self, kind: CredentialKind) -> Option<Credential> {
        self.storage.get(self.key(kind)).await.map(Credential::from)
    }

    /// Writes a credential with its fixed policy.
    pub async fn store(&self, kind: CredentialKind, credential: &Credential) {
        debug!(
            source = %self.source(),
            ?kind,
            token = %credential.preview(),
            "storing credential"
        );
        self.storage
            .set(self.key(kind), credential.expose(), &Self::policy(kind))
            .await;
    }

    /// Reads the access credential.
    pub async fn access_token(&self) -> Option<Credential> {
        self.get(CredentialKind::Access).await
    }

    /// Reads the refresh credential.
    pub async fn refresh_token(&self) -> Option<Credential> {
        self.get(CredentialKind::Refresh).await
    }

    /// Writes the access credential and, if issued, the rotated refresh credential.
    pub async fn store_grant(&self, grant: &RefreshGrant) {
        self.store(CredentialKind::Access, &grant.access_token).await;
        if let Some(refresh_token) = &grant.refresh_token {
            self.store(CredentialKind::Refresh, refresh_token).await;
        }
    }

    /// Removes both credentials.
    pub async fn clear(&self) {
        debug!(source = %self.source(), "clearing credentials");
        self.storage.remove(&self.token_key).await;
        self.storage.remove(&self.refresh_token_key).await;
    }

    /// Summarizes which credentials are present.
    pub async fn status(&self) -> TokenStatus {
        match (self.access_token().await, self.refresh_token().await) {
            (None, None) => TokenStatus::NotAuthenticated,
            (Some(access), None) => TokenStatus::AccessOnly {
                access_preview: access.preview(),
            },
            (Some(access), Some(_)) => TokenStatus::Refreshable {
                access_preview: access.preview(),
            },
            (None, Some(_)) => TokenStatus::RefreshOnly,
        }
    }
}

/// Which credentials a store currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Nothing stored.
    NotAuthenticated,
    /// Access credential without a way to renew it.
    AccessOnly {
        /// Preview of the access credential.
        access_preview: String,
    },
    /// Access credential that can be refreshed on a 401.
    Refreshable {
        /// Preview of the access credential.
        access_preview: String,
    },
    /// Only a refresh credential; the next 401 will renew access.
    RefreshOnly,
}

impl TokenStatus {
    /// Returns true if requests will carry a credential.
    #[must_use]
    pub const fn has_access_token(&self) -> bool {
        matches!(self, Self::AccessOnly { .. } | Self::Refreshable { .. })
    }

    /// Returns true if a 401 can be recovered by refreshing.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        matches!(self, Self::Refreshable { .. } | Self::RefreshOnly)
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not authenticated".to_string(),
            Self::AccessOnly { access_preview } => {
                format!("Access token {access_preview} (no refresh token)")
            }
            Self::Refreshable { access_preview } => {
                format!("Access token {access_preview} (will auto-refresh)")
            }
            Self::RefreshOnly => "Refresh token only (access token will be renewed)".to_string(),
        }
    }
}
