//! Credential handling for outgoing requests.
//!
//! This module provides:
//! - A credential store bound to configured keys and write policies
//! - The interceptor that attaches credentials and refreshes them on 401
//! - Single-flight coordination of concurrent refreshes
//! - The `auth:failure` notifier

mod coordinator;
mod interceptor;
mod notifier;
mod token_store;

pub use coordinator::{RefreshCoordinator, RefreshTicket};
pub use interceptor::{AuthInterceptor, RejectReason};
pub use notifier::{AuthFailureNotifier, Subscription};
pub use token_store::{TokenStatus, TokenStore};
