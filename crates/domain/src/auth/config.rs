//! Interceptor configuration

use serde::{Deserialize, Serialize};
use url::Url;

use super::TokenSource;
use crate::error::{DomainError, DomainResult};

/// Default storage key of the access credential.
pub const DEFAULT_TOKEN_KEY: &str = "access_token";
/// Default storage key of the refresh credential.
pub const DEFAULT_REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Default auth header name.
pub const DEFAULT_HEADER_NAME: &str = "Authorization";
/// Default auth scheme prefix.
pub const DEFAULT_HEADER_PREFIX: &str = "Bearer";

/// Configuration resolved once when an interceptor is built.
///
/// Every field is optional when deserializing; missing fields take the
/// defaults above. Leaving `refresh_endpoint` unset disables refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// Storage backend holding the credentials.
    pub token_source: TokenSource,
    /// Storage key of the access credential.
    pub token_key: String,
    /// Storage key of the refresh credential.
    pub refresh_token_key: String,
    /// Name of the header carrying the access credential.
    pub header_name: String,
    /// Scheme written before the credential. Not trimmed.
    pub header_prefix: String,
    /// URL receiving refresh requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_endpoint: Option<String>,
    /// Coalesce concurrent refresh attempts into one call.
    pub dedupe_refresh: bool,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            token_source: TokenSource::default(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            refresh_token_key: DEFAULT_REFRESH_TOKEN_KEY.to_string(),
            header_name: DEFAULT_HEADER_NAME.to_string(),
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
            refresh_endpoint: None,
            dedupe_refresh: true,
        }
    }
}

impl InterceptorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token source.
    #[must_use]
    pub const fn with_token_source(mut self, source: TokenSource) -> Self {
        self.token_source = source;
        self
    }

    /// Sets the access credential storage key.
    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Sets the refresh credential storage key.
    #[must_use]
    pub fn with_refresh_token_key(mut self, key: impl Into<String>) -> Self {
        self.refresh_token_key = key.into();
        self
    }

    /// Sets the auth header name.
    #[must_use]
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Sets the auth scheme prefix. An empty prefix is kept as is.
    #[must_use]
    pub fn with_header_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.header_prefix = prefix.into();
        self
    }

    /// Enables refresh against the given endpoint.
    #[must_use]
    pub fn with_refresh_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.refresh_endpoint = Some(endpoint.into());
        self
    }

    /// Turns refresh coalescing on or off.
    #[must_use]
    pub const fn with_dedupe_refresh(mut self, dedupe: bool) -> Self {
        self.dedupe_refresh = dedupe;
        self
    }

    /// Returns true if a refresh endpoint is configured.
    #[must_use]
    pub const fn refresh_enabled(&self) -> bool {
        self.refresh_endpoint.is_some()
    }

    /// Formats the auth header value for a credential.
    ///
    /// The prefix and token are joined by a single space, so an empty
    /// prefix yields a leading space.
    #[must_use]
    pub fn header_value(&self, token: &str) -> String {
        format!("{} {token}", self.header_prefix)
    }

    /// Checks the header name and refresh endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name is not a valid HTTP token or
    /// the refresh endpoint is not an absolute URL.
    pub fn validate(&self) -> DomainResult<()> {
        if self.header_name.is_empty()
            || !self
                .header_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
        {
            return Err(DomainError::InvalidHeaderName(self.header_name.clone()));
        }

        if let Some(endpoint) = &self.refresh_endpoint {
            Url::parse(endpoint).map_err(|e| DomainError::InvalidUrl(format!("{e}: {endpoint}")))?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = InterceptorConfig::default();
        assert_eq!(config.token_source, TokenSource::Cookie);
        assert_eq!(config.token_key, "access_token");
        assert_eq!(config.refresh_token_key, "refresh_token");
        assert_eq!(config.header_name, "Authorization");
        assert_eq!(config.header_prefix, "Bearer");
        assert_eq!(config.refresh_endpoint, None);
        assert!(!config.refresh_enabled());
        assert!(config.dedupe_refresh);
    }

    #[test]
    fn test_header_value_keeps_empty_prefix() {
        let config = InterceptorConfig::new().with_header_prefix("");
        assert_eq!(config.header_value("custom-token"), " custom-token");

        let config = InterceptorConfig::new();
        assert_eq!(config.header_value("T"), "Bearer T");
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: InterceptorConfig = serde_json::from_str(
            r#"{"token_source":"session","refresh_endpoint":"https://api.example.com/auth/refresh"}"#,
        )
        .unwrap();
        assert_eq!(config.token_source, TokenSource::SessionPersistent);
        assert_eq!(config.token_key, "access_token");
        assert!(config.refresh_enabled());
    }

    #[test]
    fn test_validate() {
        assert!(InterceptorConfig::new().validate().is_ok());
        assert!(
            InterceptorConfig::new()
                .with_header_name("X Auth")
                .validate()
                .is_err()
        );
        assert!(
            InterceptorConfig::new()
                .with_refresh_endpoint("/auth/refresh")
                .validate()
                .is_err()
        );
        assert!(
            InterceptorConfig::new()
                .with_refresh_endpoint("https://api.example.com/auth/refresh")
                .validate()
                .is_ok()
        );
    }
}
