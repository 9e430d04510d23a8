//! HTTP transport implementation using reqwest.
//!
//! Non-success statuses are reported as [`TransportError::Status`] carrying
//! the full response, so the auth interceptor can react to a 401.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use authgate_application::ports::{HttpTransport, TransportError};
use authgate_domain::{Header, HttpMethod, RequestSpec, ResponseSpec};
use reqwest::{Client, Method, Url};
use tracing::debug;

/// Redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "authgate/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("authgate/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a transport over a preconfigured client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub(crate) const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn validate_body(request: &RequestSpec) -> Result<(), TransportError> {
        let Some(body) = request.body.as_deref() else {
            return Ok(());
        };
        let is_json = request
            .headers
            .get("content-type")
            .is_some_and(|ct| ct.contains("application/json"));
        if is_json && !body.is_empty() {
            serde_json::from_str::<serde_json::Value>(body)
                .map_err(|e| TransportError::InvalidBody(format!("invalid JSON: {e}")))?;
        }
        Ok(())
    }

    pub(crate) fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", request.url)))?;
        Self::validate_body(request)?;

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(request.timeout_ms));
        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, request.timeout_ms))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?;

        let mut spec = ResponseSpec::new(status.as_u16(), body).with_duration(start.elapsed());
        spec.headers = headers;

        debug!(
            request_id = %request.id,
            status = spec.status,
            elapsed_ms = u64::try_from(spec.duration.as_millis()).unwrap_or(u64::MAX),
            "response received"
        );

        if status.is_success() {
            Ok(spec)
        } else {
            Err(TransportError::Status { response: spec })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Options),
            Method::OPTIONS
        );
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[tokio::test]
    async fn test_success_carries_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscribers"))
            .and(header("authorization", "Bearer T"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-total", "2")
                    .set_body_string("[1,2]"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let request = RequestSpec::get(format!("{}/subscribers", server.uri()))
            .with_header("Authorization", "Bearer T");

        let response = transport.execute(&request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "[1,2]");
        assert_eq!(response.headers.get("X-Total"), Some("2"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error_with_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let err = transport
            .execute(&RequestSpec::get(server.uri()))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.response().unwrap().body, "token expired");
    }

    #[tokio::test]
    async fn test_body_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string(r#"{"name":"x"}"#))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let request = RequestSpec::post_json(server.uri(), r#"{"name":"x"}"#);

        let response = transport.execute(&request).await.unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_rejected() {
        let transport = ReqwestTransport::new().unwrap();
        let request = RequestSpec::post_json("https://example.com", "{invalid json}");

        let err = transport.execute(&request).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let transport = ReqwestTransport::new().unwrap();
        let err = transport
            .execute(&RequestSpec::get("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }
}
