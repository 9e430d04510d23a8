//! Errors surfaced by the command line.

use authgate_application::{ApplicationError, RequestError, TransportError};
use authgate_domain::RefreshError;
use authgate_infrastructure::{ConfigError, StorageError};
use thiserror::Error;

/// Top-level error of the `authgate` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The token store could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The interceptor could not be built.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The HTTP transport could not be built.
    #[error("cannot create HTTP client: {0}")]
    Transport(#[from] TransportError),

    /// The refresh client could not be built.
    #[error("cannot create refresh client: {0}")]
    Refresh(#[from] RefreshError),

    /// The request failed.
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Result alias for command handlers.
pub type Result<T> = std::result::Result<T, AppError>;
