//! Cookie backend.
//!
//! Credentials are kept as cookies in a [`CookieJar`], carrying the
//! `Secure`, `SameSite` and expiry attributes of the write policy. Expired
//! cookies read as absent. The jar can optionally be mirrored to a JSON
//! file so it outlives the process, the way a browser keeps its cookies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use authgate_application::ports::{Clock, TokenStorage};
use authgate_domain::{Cookie, CookieJar, StoragePolicy, TokenSource};
use tokio::sync::Mutex;
use tracing::debug;

use super::file;

/// File name of the persisted jar inside the config directory.
pub const COOKIE_JAR_FILE: &str = "cookies.json";

/// Credential storage backed by a cookie jar.
pub struct CookieTokenStorage {
    jar: Mutex<CookieJar>,
    clock: Arc<dyn Clock>,
    jar_file: Option<PathBuf>,
}

impl std::fmt::Debug for CookieTokenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieTokenStorage")
            .field("jar_file", &self.jar_file)
            .finish_non_exhaustive()
    }
}

impl CookieTokenStorage {
    /// Creates an in-memory jar.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            jar: Mutex::new(CookieJar::new()),
            clock,
            jar_file: None,
        }
    }

    /// Opens a jar mirrored to `path`, loading any cookies already there.
    ///
    /// Expired cookies are dropped on load. A missing or unreadable file
    /// starts an empty jar.
    pub async fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        let path = path.into();
        let mut jar: CookieJar = file::load_or_default(&path).await;
        jar.cleanup_expired(clock.now());
        debug!(path = %path.display(), cookies = jar.len(), "opened cookie jar");

        Self {
            jar: Mutex::new(jar),
            clock,
            jar_file: Some(path),
        }
    }

    /// Default jar location: `<config dir>/authgate/cookies.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        super::config_dir().map(|dir| dir.join(COOKIE_JAR_FILE))
    }

    /// The file the jar is mirrored to, if any.
    #[must_use]
    pub fn jar_file(&self) -> Option<&Path> {
        self.jar_file.as_deref()
    }

    /// `Set-Cookie` values for every live cookie, as a server would send them.
    pub async fn set_cookie_headers(&self) -> Vec<String> {
        let now = self.clock.now();
        self.jar
            .lock()
            .await
            .all_valid(now)
            .into_iter()
            .map(Cookie::to_set_cookie_header)
            .collect()
    }

    /// `Cookie` request header value for every live cookie.
    pub async fn cookie_header(&self) -> Option<String> {
        self.jar.lock().await.cookie_header(self.clock.now())
    }

    async fn persist(&self, jar: &CookieJar) {
        if let Some(path) = &self.jar_file {
            file::save(path, jar).await;
        }
    }
}

#[async_trait]
impl TokenStorage for CookieTokenStorage {
    fn source(&self) -> TokenSource {
        TokenSource::Cookie
    }

    async fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        self.jar
            .lock()
            .await
            .get(key, now)
            .map(|cookie| cookie.value.clone())
    }

    async fn set(&self, key: &str, value: &str, policy: &StoragePolicy) {
        let cookie = Cookie::with_policy(key, value, policy, self.clock.now());
        let mut jar = self.jar.lock().await;
        jar.add(cookie);
        self.persist(&jar).await;
    }

    async fn remove(&self, key: &str) {
        let mut jar = self.jar.lock().await;
        if jar.remove(key).is_some() {
            self.persist(&jar).await;
        }
    }
}
