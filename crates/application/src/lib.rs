//! Authgate Application - Ports and the authentication pipeline
//!
//! This crate defines the application layer with:
//! - Port traits for storage, transport, refresh and time
//! - The auth interceptor and the client that drives it
//! - Application-level error handling

pub mod auth;
pub mod client;
pub mod error;
pub mod ports;
pub mod test_utils;

pub use auth::{
    AuthFailureNotifier, AuthInterceptor, RefreshCoordinator, RejectReason, Subscription,
    TokenStatus, TokenStore,
};
pub use client::AuthenticatedClient;
pub use error::{ApplicationError, ApplicationResult, RequestError};
pub use ports::{Clock, HttpTransport, RefreshEndpoint, TokenStorage, TransportError};
