//! Authgate Domain - Core types
//!
//! This crate defines the domain model for the Authgate authenticated
//! HTTP client: credentials, interceptor configuration, storage policies,
//! cookies, and request/response specifications.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod cookie;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{
    AuthFailure, AuthFailureReason, Credential, CredentialKind, InterceptorConfig, RefreshError,
    RefreshGrant, StoragePolicy, TokenSource,
};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, RequestContext, RequestSpec};
pub use response::ResponseSpec;
