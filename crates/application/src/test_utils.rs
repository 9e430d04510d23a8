//! In-memory doubles for the ports, shared by unit and integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use authgate_domain::{
    AuthFailure, Credential, RefreshError, RefreshGrant, RequestSpec, ResponseSpec, StoragePolicy,
    TokenSource,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::auth::AuthFailureNotifier;
use crate::ports::{Clock, HttpTransport, RefreshEndpoint, TokenStorage, TransportError};

/// A storage operation observed by [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    /// `set(key, value, policy)`
    Set {
        /// Key written.
        key: String,
        /// Value written.
        value: String,
        /// Policy passed along.
        policy: StoragePolicy,
    },
    /// `remove(key)`
    Remove {
        /// Key removed.
        key: String,
    },
}

/// Map-backed storage that records every write and removal.
#[derive(Debug)]
pub struct MemoryStorage {
    source: TokenSource,
    values: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<StorageCall>>,
}

impl MemoryStorage {
    /// Creates empty storage that reports the given source.
    #[must_use]
    pub fn new(source: TokenSource) -> Self {
        Self {
            source,
            values: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Seeds a value without recording a call.
    pub fn insert(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    /// Current value of a key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Recorded writes and removals, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().clone()
    }

    /// Returns true if `remove` was called for any key.
    #[must_use]
    pub fn removed_anything(&self) -> bool {
        self.calls
            .lock()
            .iter()
            .any(|c| matches!(c, StorageCall::Remove { .. }))
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    fn source(&self) -> TokenSource {
        self.source
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.value(key)
    }

    async fn set(&self, key: &str, value: &str, policy: &StoragePolicy) {
        self.calls.lock().push(StorageCall::Set {
            key: key.to_string(),
            value: value.to_string(),
            policy: *policy,
        });
        self.insert(key, value);
    }

    async fn remove(&self, key: &str) {
        self.calls.lock().push(StorageCall::Remove {
            key: key.to_string(),
        });
        self.values.lock().remove(key);
    }
}

type Handler = Box<dyn Fn(&RequestSpec) -> Result<ResponseSpec, TransportError> + Send + Sync>;

/// Transport that answers from a queue or a handler and records requests.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ResponseSpec, TransportError>>>,
    handler: Option<Handler>,
    requests: Mutex<Vec<RequestSpec>>,
}

impl ScriptedTransport {
    /// Answers requests with the given outcomes, in order.
    #[must_use]
    pub fn with_responses(
        responses: impl IntoIterator<Item = Result<ResponseSpec, TransportError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            handler: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request. Used where no request is expected.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_responses(Vec::<Result<ResponseSpec, TransportError>>::new())
    }

    /// Answers every request by calling `handler`.
    #[must_use]
    pub fn with_handler(
        handler: impl Fn(&RequestSpec) -> Result<ResponseSpec, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            handler: Some(Box::new(handler)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().clone()
    }

    /// Number of requests seen so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(handler) = &self.handler {
            return handler(request);
        }
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".to_string())))
    }
}

/// Builds a status error as a transport would report it.
#[must_use]
pub fn status_error(status: u16) -> TransportError {
    TransportError::Status {
        response: ResponseSpec::new(status, format!("status {status}")),
    }
}

/// Refresh endpoint that returns a fixed outcome and counts calls.
pub struct ScriptedRefreshEndpoint {
    outcome: Result<RefreshGrant, RefreshError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, Credential)>>,
}

impl ScriptedRefreshEndpoint {
    /// Endpoint that always succeeds with `grant`.
    #[must_use]
    pub fn succeeding(grant: RefreshGrant) -> Self {
        Self::with_outcome(Ok(grant))
    }

    /// Endpoint that always fails with `error`.
    #[must_use]
    pub fn failing(error: RefreshError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<RefreshGrant, RefreshError>) -> Self {
        Self {
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps before answering, to keep concurrent callers overlapping.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of refresh calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Endpoint URLs and refresh credentials received, oldest first.
    #[must_use]
    pub fn seen(&self) -> Vec<(String, Credential)> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl RefreshEndpoint for ScriptedRefreshEndpoint {
    async fn refresh(
        &self,
        endpoint: &str,
        refresh_token: &Credential,
    ) -> Result<RefreshGrant, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .push((endpoint.to_string(), refresh_token.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Registers a handler that records every failure it receives.
#[must_use]
pub fn record_failures(notifier: &AuthFailureNotifier) -> Arc<Mutex<Vec<AuthFailure>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    notifier.on_auth_failure(move |failure| sink.lock().push(*failure));
    seen
}
