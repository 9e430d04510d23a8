//! Authgate Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod serialization;
pub mod settings;
pub mod storage;

pub use adapters::{ReqwestRefreshEndpoint, ReqwestTransport, SystemClock};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
pub use settings::{ConfigError, ConfigLoader};
pub use storage::{
    CookieTokenStorage, LocalTokenStorage, SessionTokenStorage, StorageError, StorageOptions,
    token_storage_for,
};
