//! Authentication domain types

mod config;
mod credential;
mod failure;
mod grant;
mod policy;
mod token_source;

pub use config::{
    DEFAULT_HEADER_NAME, DEFAULT_HEADER_PREFIX, DEFAULT_REFRESH_TOKEN_KEY, DEFAULT_TOKEN_KEY,
    InterceptorConfig,
};
pub use credential::{Credential, CredentialKind};
pub use failure::{AUTH_FAILURE_EVENT, AuthFailure, AuthFailureReason};
pub use grant::{RefreshError, RefreshGrant};
pub use policy::{ACCESS_TOKEN_EXPIRY_DAYS, REFRESH_TOKEN_EXPIRY_DAYS, StoragePolicy};
pub use token_source::TokenSource;
