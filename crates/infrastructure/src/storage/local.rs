//! Local-persistent backend: a JSON file that survives restarts.
//!
//! The file holds a flat map of key to value:
//! ```json
//! {
//!   "access_token": "eyJhbGciOi...",
//!   "refresh_token": "dGhpcyBpcyBh..."
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use authgate_application::ports::TokenStorage;
use authgate_domain::{StoragePolicy, TokenSource};
use tokio::sync::Mutex;

use super::file;

/// File name of the token file inside the config directory.
pub const LOCAL_TOKEN_FILE: &str = "tokens.json";

type TokenMap = BTreeMap<String, String>;

/// Credential storage in a JSON file.
#[derive(Debug)]
pub struct LocalTokenStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalTokenStorage {
    /// Stores credentials in the file at `path`.
    ///
    /// The file and its parent directories are created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Default file location: `<config dir>/authgate/tokens.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        super::config_dir().map(|dir| dir.join(LOCAL_TOKEN_FILE))
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn update(&self, apply: impl FnOnce(&mut TokenMap) -> bool) {
        let _guard = self.write_lock.lock().await;
        let mut tokens: TokenMap = file::load_or_default(&self.path).await;
        if apply(&mut tokens) {
            file::save(&self.path, &tokens).await;
        }
    }
}

#[async_trait]
impl TokenStorage for LocalTokenStorage {
    fn source(&self) -> TokenSource {
        TokenSource::LocalPersistent
    }

    async fn get(&self, key: &str) -> Option<String> {
        let mut tokens: TokenMap = file::load_or_default(&self.path).await;
        tokens.remove(key)
    }

    async fn set(&self, key: &str, value: &str, _policy: &StoragePolicy) {
        self.update(|tokens| {
            tokens.insert(key.to_string(), value.to_string());
            true
        })
        .await;
    }

    async fn remove(&self, key: &str) {
        self.update(|tokens| tokens.remove(key).is_some()).await;
    }
}
