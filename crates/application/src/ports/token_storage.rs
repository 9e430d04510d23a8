//! Token storage port

use async_trait::async_trait;
use authgate_domain::{StoragePolicy, TokenSource};

/// Key/value storage for credentials.
///
/// One implementation exists per [`TokenSource`]. Operations never fail:
/// when the backend is unavailable, reads degrade to `None` and writes are
/// dropped, with the problem logged by the adapter.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// The backend this adapter implements.
    fn source(&self) -> TokenSource;

    /// Reads a value.
    async fn get(&self, key: &str) -> Option<String>;

    /// Writes a value. Backends without attribute support ignore `policy`.
    async fn set(&self, key: &str, value: &str, policy: &StoragePolicy);

    /// Deletes a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str);
}
