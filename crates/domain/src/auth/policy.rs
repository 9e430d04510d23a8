//! Write policy attached to stored credentials

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cookie::SameSite;

/// Days an access credential is kept before the backend may drop it.
pub const ACCESS_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Days a refresh credential is kept before the backend may drop it.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Attributes applied when a credential is written.
///
/// Only the cookie backend honours them; the other backends ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoragePolicy {
    /// Only send over HTTPS.
    pub secure: bool,
    /// Cross-site sending policy.
    pub same_site: SameSite,
    /// Lifetime in days.
    pub expires_in_days: i64,
}

impl StoragePolicy {
    /// Policy for access credentials: secure, strict, 7 days.
    #[must_use]
    pub const fn access() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Strict,
            expires_in_days: ACCESS_TOKEN_EXPIRY_DAYS,
        }
    }

    /// Policy for refresh credentials: secure, strict, 30 days.
    #[must_use]
    pub const fn refresh() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Strict,
            expires_in_days: REFRESH_TOKEN_EXPIRY_DAYS,
        }
    }

    /// Absolute expiry for a credential written at `now`.
    #[must_use]
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.expires_in_days)
    }
}
