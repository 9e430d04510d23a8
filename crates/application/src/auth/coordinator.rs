//! Single-flight coordination of refresh attempts.
//!
//! When several requests hit a 401 at the same time, only the first one to
//! take the lock calls the refresh endpoint. Callers that entered before
//! that attempt finished reuse its outcome instead of refreshing again.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use authgate_domain::{RefreshError, RefreshGrant};
use tokio::sync::Mutex;
use tracing::debug;

/// Position in the sequence of completed refresh attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

#[derive(Debug, Default)]
struct RefreshState {
    generation: u64,
    last: Option<Result<RefreshGrant, RefreshError>>,
}

/// Serializes refresh attempts and shares their outcome.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    generation: AtomicU64,
}

impl RefreshCoordinator {
    /// Creates a coordinator with no completed attempts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a ticket. Must be called as soon as the 401 is observed.
    #[must_use]
    pub fn ticket(&self) -> RefreshTicket {
        RefreshTicket(self.generation.load(Ordering::Acquire))
    }

    /// Number of refresh attempts that have completed.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Runs `attempt` unless an attempt completed after `ticket` was taken.
    ///
    /// In that case the earlier outcome is returned and `attempt` is dropped
    /// without being polled. A shared failure is reported as
    /// [`RefreshError::Coalesced`].
    ///
    /// # Errors
    ///
    /// Returns the error of the attempt that ran, or `Coalesced`.
    pub async fn run<F>(&self, ticket: RefreshTicket, attempt: F) -> Result<RefreshGrant, RefreshError>
    where
        F: Future<Output = Result<RefreshGrant, RefreshError>>,
    {
        let mut state = self.state.lock().await;

        if state.generation != ticket.0
            && let Some(outcome) = &state.last
        {
            debug!(
                generation = state.generation,
                ok = outcome.is_ok(),
                "reusing outcome of concurrent refresh"
            );
            return outcome.clone().map_err(|_| RefreshError::Coalesced);
        }

        let outcome = attempt.await;
        state.generation += 1;
        state.last = Some(outcome.clone());
        self.generation.store(state.generation, Ordering::Release);
        outcome
    }
}
