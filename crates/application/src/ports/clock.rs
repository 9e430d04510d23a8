//! Clock port

use chrono::{DateTime, Utc};

/// Source of the current time, used to stamp and expire stored cookies.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
