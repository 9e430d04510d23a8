//! Session-persistent backend: values live as long as the process.

use std::collections::HashMap;

use async_trait::async_trait;
use authgate_application::ports::TokenStorage;
use authgate_domain::{StoragePolicy, TokenSource};
use parking_lot::RwLock;

/// In-memory credential storage scoped to the running process.
#[derive(Debug, Default)]
pub struct SessionTokenStorage {
    values: RwLock<HashMap<String, String>>,
}

impl SessionTokenStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for SessionTokenStorage {
    fn source(&self) -> TokenSource {
        TokenSource::SessionPersistent
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str, _policy: &StoragePolicy) {
        self.values.write().insert(key.to_string(), value.to_string());
    }

    async fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}
