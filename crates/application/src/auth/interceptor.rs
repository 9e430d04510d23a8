//! Bearer credential interceptor with transparent refresh.
//!
//! Outgoing requests are decorated with the stored access credential. When
//! a request comes back 401, the interceptor exchanges the refresh
//! credential for a new access credential once and re-issues the request.
//!
//! Failure handling is asymmetric:
//! - a refresh call that fails leaves stored credentials alone, since they
//!   may still serve other requests;
//! - a retry that fails after a successful refresh clears both credentials
//!   and notifies [`AuthFailureNotifier`] handlers.
//!
//! Either way the caller gets back the error of the original request.

use std::fmt;
use std::sync::Arc;

use authgate_domain::{
    AuthFailure, Credential, InterceptorConfig, RefreshError, RefreshGrant, RequestContext,
    ResponseSpec,
};
use tracing::{debug, info, warn};

use super::{AuthFailureNotifier, RefreshCoordinator, TokenStore};
use crate::error::{ApplicationError, ApplicationResult, RequestError};
use crate::ports::{HttpTransport, RefreshEndpoint, TokenStorage};

/// Why a rejected request was handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Not a 401.
    NonAuth,
    /// 401 on a request that was already retried.
    AlreadyRetried,
    /// No refresh credential stored or no endpoint configured.
    NoRefreshMaterial,
    /// The refresh call produced no usable credential.
    RefreshCall,
    /// The retry after a successful refresh failed.
    RetryFailure,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NonAuth => "non_auth",
            Self::AlreadyRetried => "already_retried",
            Self::NoRefreshMaterial => "no_refresh_material",
            Self::RefreshCall => "refresh_call_failed",
            Self::RetryFailure => "retry_failed",
        })
    }
}

/// Attaches credentials to requests and recovers from expired ones.
pub struct AuthInterceptor {
    config: InterceptorConfig,
    store: TokenStore,
    refresher: Arc<dyn RefreshEndpoint>,
    coordinator: RefreshCoordinator,
    notifier: Arc<AuthFailureNotifier>,
}

impl fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInterceptor")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl AuthInterceptor {
    /// Builds an interceptor over one storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the storage
    /// adapter does not implement the configured token source.
    pub fn new(
        config: InterceptorConfig,
        storage: Arc<dyn TokenStorage>,
        refresher: Arc<dyn RefreshEndpoint>,
    ) -> ApplicationResult<Self> {
        config.validate()?;

        let actual = storage.source();
        if actual != config.token_source {
            return Err(ApplicationError::TokenSourceMismatch {
                configured: config.token_source,
                actual,
            });
        }

        Ok(Self {
            store: TokenStore::new(storage, &config),
            config,
            refresher,
            coordinator: RefreshCoordinator::new(),
            notifier: Arc::new(AuthFailureNotifier::new()),
        })
    }

    /// Uses a shared notifier instead of a private one.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<AuthFailureNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// The resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    /// The credential store this interceptor reads and writes.
    #[must_use]
    pub const fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// The notifier receiving `auth:failure` signals.
    #[must_use]
    pub const fn notifier(&self) -> &Arc<AuthFailureNotifier> {
        &self.notifier
    }

    /// Sets the auth header from the stored access credential.
    ///
    /// Requests with `skip_auth` are returned untouched without reading
    /// storage. Without a stored credential the request is also untouched.
    pub async fn decorate(&self, mut context: RequestContext) -> RequestContext {
        if context.skip_auth {
            debug!(request_id = %context.request.id, "skip_auth set, not attaching credential");
            return context;
        }

        match self.store.access_token().await {
            Some(token) => {
                context
                    .request
                    .headers
                    .set(&self.config.header_name, self.config.header_value(token.expose()));
                debug!(
                    request_id = %context.request.id,
                    header = %self.config.header_name,
                    token = %token.preview(),
                    "attached credential"
                );
            }
            None => {
                debug!(request_id = %context.request.id, "no stored credential");
            }
        }

        context
    }

    /// Success arm of the response hook.
    #[must_use]
    pub const fn on_fulfilled(response: ResponseSpec) -> ResponseSpec {
        response
    }

    /// Failure arm of the response hook.
    ///
    /// On a first 401 with refresh material available, refreshes the
    /// credential and re-issues the request through `transport`. Resolves
    /// with the retry's response, or hands `error` back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the original `error`. Its `context.retried` flag is set if a
    /// retry was attempted.
    pub async fn on_rejected<T>(
        &self,
        mut error: RequestError,
        transport: &T,
    ) -> Result<ResponseSpec, RequestError>
    where
        T: HttpTransport + ?Sized,
    {
        if !error.source.is_unauthorized() {
            return Err(Self::reject(error, RejectReason::NonAuth));
        }
        if error.context.retried {
            return Err(Self::reject(error, RejectReason::AlreadyRetried));
        }

        let ticket = self.coordinator.ticket();

        let Some(refresh_token) = self.store.refresh_token().await else {
            return Err(Self::reject(error, RejectReason::NoRefreshMaterial));
        };
        let Some(endpoint) = self.config.refresh_endpoint.as_deref() else {
            return Err(Self::reject(error, RejectReason::NoRefreshMaterial));
        };

        let attempt = self.refresh(endpoint, &refresh_token);
        let refreshed = if self.config.dedupe_refresh {
            self.coordinator.run(ticket, attempt).await
        } else {
            attempt.await
        };
        if let Err(refresh_error) = refreshed {
            warn!(
                request_id = %error.context.request.id,
                error = %refresh_error,
                "token refresh failed, keeping stored credentials"
            );
            return Err(Self::reject(error, RejectReason::RefreshCall));
        }

        error.context.retried = true;
        let retry = self.decorate(error.context.clone()).await;

        match transport.execute(&retry.request).await {
            Ok(response) => {
                debug!(
                    request_id = %retry.request.id,
                    status = response.status,
                    "retry after refresh succeeded"
                );
                Ok(response)
            }
            Err(retry_error) => {
                warn!(
                    request_id = %retry.request.id,
                    error = %retry_error,
                    "retry after refresh failed, clearing credentials"
                );
                self.store.clear().await;
                self.notifier.notify(&AuthFailure::token_refresh_failed());
                Err(Self::reject(error, RejectReason::RetryFailure))
            }
        }
    }

    /// Calls the endpoint and stores what it returns.
    ///
    /// Storing happens before the attempt completes so that callers sharing
    /// the outcome read the new credential when they retry.
    async fn refresh(
        &self,
        endpoint: &str,
        refresh_token: &Credential,
    ) -> Result<RefreshGrant, RefreshError> {
        debug!(endpoint, "refreshing access token");
        let grant = self.refresher.refresh(endpoint, refresh_token).await?;
        self.store.store_grant(&grant).await;
        info!(
            token = %grant.access_token.preview(),
            rotated_refresh_token = grant.refresh_token.is_some(),
            "access token refreshed"
        );
        Ok(grant)
    }

    fn reject(error: RequestError, reason: RejectReason) -> RequestError {
        debug!(
            request_id = %error.context.request.id,
            status = ?error.status(),
            %reason,
            "passing error through"
        );
        error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_utils::{
        MemoryStorage, ScriptedRefreshEndpoint, ScriptedTransport, StorageCall, record_failures,
        status_error,
    };
    use authgate_domain::{AuthFailureReason, Headers, RequestSpec, StoragePolicy, TokenSource};
    use pretty_assertions::assert_eq;

    const REFRESH_URL: &str = "https://api.example.com/auth/refresh";

    struct Fixture {
        interceptor: AuthInterceptor,
        storage: Arc<MemoryStorage>,
        refresher: Arc<ScriptedRefreshEndpoint>,
    }

    fn fixture(config: InterceptorConfig, refresher: ScriptedRefreshEndpoint) -> Fixture {
        let storage = Arc::new(MemoryStorage::new(config.token_source));
        let refresher = Arc::new(refresher);
        let interceptor =
            AuthInterceptor::new(config, storage.clone(), refresher.clone()).expect("valid config");
        Fixture {
            interceptor,
            storage,
            refresher,
        }
    }

    fn refreshing_config() -> InterceptorConfig {
        InterceptorConfig::new().with_refresh_endpoint(REFRESH_URL)
    }

    fn unauthorized(context: RequestContext) -> RequestError {
        RequestError::new(context, status_error(401))
    }

    fn ctx() -> RequestContext {
        RequestContext::new(RequestSpec::get("https://api.example.com/subscribers"))
    }

    #[tokio::test]
    async fn test_decorate_adds_bearer_header() {
        let f = fixture(InterceptorConfig::new(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")));
        f.storage.insert("access_token", "T");

        let decorated = f.interceptor.decorate(ctx()).await;

        assert_eq!(decorated.request.headers.get("Authorization"), Some("Bearer T"));
    }

    #[tokio::test]
    async fn test_decorate_empty_prefix_keeps_leading_space() {
        let f = fixture(
            InterceptorConfig::new().with_header_prefix(""),
            ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")),
        );
        f.storage.insert("access_token", "custom-token");

        let decorated = f.interceptor.decorate(ctx()).await;

        assert_eq!(decorated.request.headers.get("Authorization"), Some(" custom-token"));
    }

    #[tokio::test]
    async fn test_decorate_custom_header_and_key() {
        let f = fixture(
            InterceptorConfig::new()
                .with_header_name("X-Api-Token")
                .with_header_prefix("Token")
                .with_token_key("jwt"),
            ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")),
        );
        f.storage.insert("jwt", "abc");

        let decorated = f.interceptor.decorate(ctx()).await;

        assert_eq!(decorated.request.headers.get("X-Api-Token"), Some("Token abc"));
        assert!(!decorated.request.headers.contains("Authorization"));
    }

    #[tokio::test]
    async fn test_decorate_skip_auth_is_untouched() {
        let f = fixture(InterceptorConfig::new(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")));
        f.storage.insert("access_token", "T");
        let context = ctx().skip_auth();

        let decorated = f.interceptor.decorate(context.clone()).await;

        assert_eq!(decorated, context);
        assert!(!decorated.request.headers.contains("Authorization"));
    }

    #[tokio::test]
    async fn test_decorate_without_token_preserves_headers() {
        let f = fixture(InterceptorConfig::new(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")));
        let mut context = ctx();
        context.request.headers = [("X-Tenant", "acme")].into_iter().collect::<Headers>();

        let decorated = f.interceptor.decorate(context.clone()).await;

        assert_eq!(decorated, context);
    }

    #[tokio::test]
    async fn test_decorate_preserves_existing_headers() {
        let f = fixture(InterceptorConfig::new(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")));
        f.storage.insert("access_token", "T");
        let mut context = ctx();
        context.request.headers.set("X-Tenant", "acme");
        context.request.headers.set("Accept", "application/json");

        let decorated = f.interceptor.decorate(context).await;

        assert_eq!(decorated.request.headers.len(), 3);
        assert_eq!(decorated.request.headers.get("X-Tenant"), Some("acme"));
        assert_eq!(decorated.request.headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn test_on_fulfilled_is_identity() {
        let response = ResponseSpec::new(200, "ok").with_header("X-Trace", "1");
        assert_eq!(AuthInterceptor::on_fulfilled(response.clone()), response);
    }

    #[tokio::test]
    async fn test_non_401_passes_through() {
        let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        f.storage.insert("refresh_token", "R");
        let transport = ScriptedTransport::empty();

        for status in [400, 403, 404, 500] {
            let original = RequestError::new(ctx(), status_error(status));
            let err = f
                .interceptor
                .on_rejected(original.clone(), &transport)
                .await
                .unwrap_err();
            assert_eq!(err, original);
        }

        assert_eq!(f.refresher.call_count(), 0);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_network_error_without_response_passes_through() {
        let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        f.storage.insert("refresh_token", "R");
        let transport = ScriptedTransport::empty();
        let original = RequestError::new(ctx(), crate::ports::TransportError::Timeout { timeout_ms: 10 });

        let err = f.interceptor.on_rejected(original.clone(), &transport).await.unwrap_err();

        assert_eq!(err, original);
        assert_eq!(f.refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_already_retried_rejects_without_refresh() {
        let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        f.storage.insert("refresh_token", "R");
        let transport = ScriptedTransport::empty();
        let original = unauthorized(ctx().retried());

        let err = f.interceptor.on_rejected(original.clone(), &transport).await.unwrap_err();

        assert_eq!(err, original);
        assert_eq!(f.refresher.call_count(), 0);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_rejects_without_network() {
        let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        let transport = ScriptedTransport::empty();
        let original = unauthorized(ctx());

        let err = f.interceptor.on_rejected(original.clone(), &transport).await.unwrap_err();

        assert_eq!(err, original);
        assert_eq!(f.refresher.call_count(), 0);
        assert_eq!(transport.call_count(), 0);
        assert!(f.storage.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_endpoint_rejects_without_network() {
        let f = fixture(InterceptorConfig::new(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        f.storage.insert("refresh_token", "R");
        let transport = ScriptedTransport::empty();
        let original = unauthorized(ctx());

        let err = f.interceptor.on_rejected(original.clone(), &transport).await.unwrap_err();

        assert_eq!(err, original);
        assert_eq!(f.refresher.call_count(), 0);
        assert!(f.storage.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_refresh_and_retry() {
        let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        f.storage.insert("access_token", "old");
        f.storage.insert("refresh_token", "R");
        let transport = ScriptedTransport::with_responses([Ok(ResponseSpec::new(200, "subscribers"))]);
        let first = f.interceptor.decorate(ctx()).await;
        assert_eq!(first.request.headers.get("Authorization"), Some("Bearer old"));

        let response = f
            .interceptor
            .on_rejected(unauthorized(first), &transport)
            .await
            .unwrap();

        assert_eq!(response.body, "subscribers");
        assert_eq!(
            f.refresher.seen(),
            vec![(REFRESH_URL.to_string(), Credential::new("R"))]
        );
        assert_eq!(
            f.storage.calls(),
            vec![StorageCall::Set {
                key: "access_token".to_string(),
                value: "new".to_string(),
                policy: StoragePolicy::access(),
            }]
        );
        let retried = transport.requests();
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].headers.get("Authorization"), Some("Bearer new"));
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        let f = fixture(
            refreshing_config(),
            ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new").with_refresh_token("R2")),
        );
        f.storage.insert("refresh_token", "R");
        let transport = ScriptedTransport::with_responses([Ok(ResponseSpec::new(200, ""))]);

        f.interceptor.on_rejected(unauthorized(ctx()), &transport).await.unwrap();

        assert_eq!(f.storage.value("refresh_token").as_deref(), Some("R2"));
        assert!(f.storage.calls().contains(&StorageCall::Set {
            key: "refresh_token".to_string(),
            value: "R2".to_string(),
            policy: StoragePolicy::refresh(),
        }));
    }

    #[tokio::test]
    async fn test_retry_failure_tears_down_and_notifies_once() {
        let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        f.storage.insert("access_token", "old");
        f.storage.insert("refresh_token", "R");
        let failures = record_failures(f.interceptor.notifier());
        let transport = ScriptedTransport::with_responses([Err(status_error(503))]);
        let original = unauthorized(ctx());

        let err = f.interceptor.on_rejected(original.clone(), &transport).await.unwrap_err();

        assert_eq!(err.source, original.source);
        assert_eq!(err.context.request, original.context.request);
        assert!(err.context.retried);
        assert_eq!(f.storage.value("access_token"), None);
        assert_eq!(f.storage.value("refresh_token"), None);
        assert!(f.storage.calls().contains(&StorageCall::Remove {
            key: "access_token".to_string()
        }));
        assert!(f.storage.calls().contains(&StorageCall::Remove {
            key: "refresh_token".to_string()
        }));
        let failures = failures.lock();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].reason, AuthFailureReason::TokenRefreshFailed);
    }

    #[tokio::test]
    async fn test_retry_401_tears_down() {
        let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")));
        f.storage.insert("refresh_token", "R");
        let failures = record_failures(f.interceptor.notifier());
        let transport = ScriptedTransport::with_responses([Err(status_error(401))]);

        let err = f.interceptor.on_rejected(unauthorized(ctx()), &transport).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(f.refresher.call_count(), 1);
        assert_eq!(failures.lock().len(), 1);
        assert!(f.storage.removed_anything());
    }

    #[tokio::test]
    async fn test_refresh_failures_preserve_credentials() {
        let errors = [
            RefreshError::Network("connection reset".to_string()),
            RefreshError::Status { status: 500 },
            RefreshError::MalformedBody("expected value".to_string()),
            RefreshError::MissingAccessToken,
        ];

        for refresh_error in errors {
            let f = fixture(refreshing_config(), ScriptedRefreshEndpoint::failing(refresh_error));
            f.storage.insert("access_token", "old");
            f.storage.insert("refresh_token", "R");
            let failures = record_failures(f.interceptor.notifier());
            let transport = ScriptedTransport::empty();
            let original = unauthorized(ctx());

            let err = f.interceptor.on_rejected(original.clone(), &transport).await.unwrap_err();

            assert_eq!(err, original);
            assert!(!f.storage.removed_anything());
            assert!(f.storage.calls().is_empty());
            assert_eq!(f.storage.value("access_token").as_deref(), Some("old"));
            assert_eq!(transport.call_count(), 0);
            assert!(failures.lock().is_empty());
        }
    }

    #[tokio::test]
    async fn test_source_mismatch_is_rejected() {
        let storage = Arc::new(MemoryStorage::new(TokenSource::SessionPersistent));
        let refresher = Arc::new(ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")));

        let result = AuthInterceptor::new(InterceptorConfig::new(), storage, refresher);

        assert!(matches!(
            result,
            Err(ApplicationError::TokenSourceMismatch {
                configured: TokenSource::Cookie,
                actual: TokenSource::SessionPersistent,
            })
        ));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let storage = Arc::new(MemoryStorage::new(TokenSource::Cookie));
        let refresher = Arc::new(ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("x")));

        let result = AuthInterceptor::new(
            InterceptorConfig::new().with_refresh_endpoint("not a url"),
            storage,
            refresher,
        );

        assert!(matches!(result, Err(ApplicationError::Domain(_))));
    }

    #[tokio::test]
    async fn test_independent_refresh_when_dedupe_disabled() {
        let f = fixture(
            refreshing_config().with_dedupe_refresh(false),
            ScriptedRefreshEndpoint::succeeding(RefreshGrant::new("new")),
        );
        f.storage.insert("refresh_token", "R");
        let transport = ScriptedTransport::with_responses([
            Ok(ResponseSpec::new(200, "")),
            Ok(ResponseSpec::new(200, "")),
        ]);

        f.interceptor.on_rejected(unauthorized(ctx()), &transport).await.unwrap();
        f.interceptor.on_rejected(unauthorized(ctx()), &transport).await.unwrap();

        assert_eq!(f.refresher.call_count(), 2);
        assert_eq!(f.interceptor.coordinator.completed(), 0);
    }
}
