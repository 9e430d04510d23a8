//! Token storage adapters, one per [`TokenSource`].

mod cookie;
mod file;
mod local;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use authgate_application::ports::{Clock, TokenStorage};
use authgate_domain::TokenSource;
use thiserror::Error;

use crate::adapters::SystemClock;

pub use cookie::{COOKIE_JAR_FILE, CookieTokenStorage};
pub use local::{LOCAL_TOKEN_FILE, LocalTokenStorage};
pub use session::SessionTokenStorage;

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "authgate";

/// `<config dir>/authgate`, if the platform has a config directory.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// Errors building a storage adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No path was given and the platform has no config directory.
    #[error("no location for the {0} token store; pass a path explicitly")]
    NoLocation(TokenSource),
}

/// Where and how the adapters built by [`token_storage_for`] keep data.
#[derive(Clone)]
pub struct StorageOptions {
    /// File for the local-persistent backend. Defaults to [`LocalTokenStorage::default_path`].
    pub token_file: Option<PathBuf>,
    /// File mirroring the cookie jar. `None` keeps cookies in memory.
    pub cookie_jar_file: Option<PathBuf>,
    /// Time source for cookie expiry.
    pub clock: Arc<dyn Clock>,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            token_file: None,
            cookie_jar_file: None,
            clock: Arc::new(SystemClock::new()),
        }
    }
}

impl std::fmt::Debug for StorageOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageOptions")
            .field("token_file", &self.token_file)
            .field("cookie_jar_file", &self.cookie_jar_file)
            .finish_non_exhaustive()
    }
}

/// Builds the adapter for `source`.
///
/// # Errors
///
/// Returns an error if the local-persistent backend has no file to use.
pub async fn token_storage_for(
    source: TokenSource,
    options: &StorageOptions,
) -> Result<Arc<dyn TokenStorage>, StorageError> {
    let storage: Arc<dyn TokenStorage> = match source {
        TokenSource::Cookie => match &options.cookie_jar_file {
            Some(path) => Arc::new(CookieTokenStorage::open(path, Arc::clone(&options.clock)).await),
            None => Arc::new(CookieTokenStorage::new(Arc::clone(&options.clock))),
        },
        TokenSource::LocalPersistent => {
            let path = options
                .token_file
                .clone()
                .or_else(LocalTokenStorage::default_path)
                .ok_or(StorageError::NoLocation(source))?;
            Arc::new(LocalTokenStorage::new(path))
        }
        TokenSource::SessionPersistent => Arc::new(SessionTokenStorage::new()),
    };

    tracing::debug!(%source, "token storage ready");
    Ok(storage)
}
