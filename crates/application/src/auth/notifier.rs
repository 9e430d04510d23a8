//! Observer registry for the `auth:failure` signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use authgate_domain::AuthFailure;
use parking_lot::RwLock;
use tracing::warn;

type Handler = Arc<dyn Fn(&AuthFailure) + Send + Sync>;

/// Handle returned by [`AuthFailureNotifier::on_auth_failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Delivers authentication failures to registered handlers.
///
/// Application shells register a handler to force a re-login when the
/// interceptor tears down credentials.
#[derive(Default)]
pub struct AuthFailureNotifier {
    handlers: RwLock<Vec<(Subscription, Handler)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for AuthFailureNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFailureNotifier")
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

impl AuthFailureNotifier {
    /// Creates a notifier with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler.
    pub fn on_auth_failure(
        &self,
        handler: impl Fn(&AuthFailure) + Send + Sync + 'static,
    ) -> Subscription {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((subscription, Arc::new(handler)));
        subscription
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription);
        handlers.len() != before
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Invokes every handler in registration order.
    ///
    /// Handlers run outside the registry lock, so they may register or
    /// unsubscribe handlers themselves.
    pub fn notify(&self, failure: &AuthFailure) {
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        warn!(
            event = failure.event_type(),
            reason = %failure.reason,
            handlers = handlers.len(),
            "broadcasting authentication failure"
        );

        for handler in handlers {
            handler(failure);
        }
    }
}
