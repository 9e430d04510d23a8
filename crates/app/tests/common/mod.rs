//! Shared setup for the end-to-end tests: a mock API that only accepts the
//! refreshed credential, and a mock refresh endpoint.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use authgate_application::{AuthInterceptor, AuthenticatedClient, TokenStorage};
use authgate_domain::{InterceptorConfig, TokenSource};
use authgate_infrastructure::{
    CookieTokenStorage, LocalTokenStorage, ReqwestRefreshEndpoint, ReqwestTransport,
    SessionTokenStorage, SystemClock,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OLD_TOKEN: &str = "old-access";
pub const NEW_TOKEN: &str = "new-access";
pub const REFRESH_TOKEN: &str = "refresh-1";

/// One backend under test, plus whatever keeps its files alive.
pub struct Backend {
    pub storage: Arc<dyn TokenStorage>,
    _dir: Option<TempDir>,
}

impl Backend {
    pub fn new(source: TokenSource) -> Self {
        match source {
            TokenSource::Cookie => Self {
                storage: Arc::new(CookieTokenStorage::new(Arc::new(SystemClock::new()))),
                _dir: None,
            },
            TokenSource::LocalPersistent => {
                let dir = tempfile::tempdir().unwrap();
                Self {
                    storage: Arc::new(LocalTokenStorage::new(dir.path().join("tokens.json"))),
                    _dir: Some(dir),
                }
            }
            TokenSource::SessionPersistent => Self {
                storage: Arc::new(SessionTokenStorage::new()),
                _dir: None,
            },
        }
    }
}

/// Mounts `GET /subscribers`: 200 for the new credential, 401 otherwise.
pub async fn mount_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/subscribers"))
        .and(header("authorization", format!("Bearer {NEW_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscribers"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "expired" })))
        .with_priority(2)
        .mount(server)
        .await;
}

/// Mounts `POST /auth/refresh` answering with `body` after `delay`.
pub async fn mount_refresh(
    server: &MockServer,
    status: u16,
    body: serde_json::Value,
    delay: Duration,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": REFRESH_TOKEN })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body).set_delay(delay))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn config(server: &MockServer, source: TokenSource) -> InterceptorConfig {
    InterceptorConfig::new()
        .with_token_source(source)
        .with_refresh_endpoint(format!("{}/auth/refresh", server.uri()))
}

pub fn client(
    config: InterceptorConfig,
    storage: Arc<dyn TokenStorage>,
) -> AuthenticatedClient<ReqwestTransport> {
    let interceptor =
        AuthInterceptor::new(config, storage, Arc::new(ReqwestRefreshEndpoint::new().unwrap()))
            .unwrap();
    AuthenticatedClient::new(Arc::new(ReqwestTransport::new().unwrap()), Arc::new(interceptor))
}

pub fn subscribers_url(server: &MockServer) -> String {
    format!("{}/subscribers", server.uri())
}
