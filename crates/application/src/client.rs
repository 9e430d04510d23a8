//! Authenticated request pipeline.
//!
//! Runs each request through the interceptor's request hook, the transport,
//! and the interceptor's response hooks.

use std::sync::Arc;

use authgate_domain::{RequestContext, RequestSpec, ResponseSpec};
use tracing::debug;

use crate::auth::AuthInterceptor;
use crate::error::RequestError;
use crate::ports::{HttpTransport, TransportError};

/// HTTP client that authenticates requests and recovers from expired credentials.
///
/// # Example
///
/// ```ignore
/// let client = AuthenticatedClient::new(Arc::new(ReqwestTransport::new()?), Arc::new(interceptor));
///
/// let response = client.get("https://api.example.com/subscribers").await?;
/// ```
pub struct AuthenticatedClient<T: HttpTransport + ?Sized> {
    transport: Arc<T>,
    interceptor: Arc<AuthInterceptor>,
}

impl<T: HttpTransport + ?Sized> Clone for AuthenticatedClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            interceptor: Arc::clone(&self.interceptor),
        }
    }
}

impl<T: HttpTransport + ?Sized> AuthenticatedClient<T> {
    /// Creates a client over the given transport and interceptor.
    pub const fn new(transport: Arc<T>, interceptor: Arc<AuthInterceptor>) -> Self {
        Self {
            transport,
            interceptor,
        }
    }

    /// The interceptor this client uses.
    #[must_use]
    pub const fn interceptor(&self) -> &Arc<AuthInterceptor> {
        &self.interceptor
    }

    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns the failure of the request as first sent, once any refresh
    /// and retry has been given up on.
    pub async fn send(&self, context: RequestContext) -> Result<ResponseSpec, RequestError> {
        Self::validate(&context)?;

        let context = self.interceptor.decorate(context).await;
        debug!(
            request_id = %context.request.id,
            method = %context.request.method,
            url = %context.request.url,
            "sending request"
        );

        match self.transport.execute(&context.request).await {
            Ok(response) => Ok(AuthInterceptor::on_fulfilled(response)),
            Err(source) => {
                self.interceptor
                    .on_rejected(RequestError::new(context, source), self.transport.as_ref())
                    .await
            }
        }
    }

    /// Sends an authenticated GET.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn get(&self, url: impl Into<String>) -> Result<ResponseSpec, RequestError> {
        self.send(RequestContext::new(RequestSpec::get(url))).await
    }

    fn validate(context: &RequestContext) -> Result<(), RequestError> {
        let url = context.request.url.trim();
        if url.is_empty() {
            return Err(RequestError::new(
                context.clone(),
                TransportError::InvalidUrl("URL is required".to_string()),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RequestError::new(
                context.clone(),
                TransportError::InvalidUrl(format!("URL must start with http:// or https://: {url}")),
            ));
        }
        Ok(())
    }
}
