//! Cookie types used by the cookie token backend.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::auth::StoragePolicy;

/// Bytes outside the RFC 6265 `cookie-octet` range, plus `%` itself.
const COOKIE_VALUE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b',')
    .add(b';')
    .add(b'\\');

/// A single HTTP cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Path the cookie applies to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time (None for session cookies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag.
    #[serde(default)]
    pub secure: bool,
    /// SameSite attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Create a new session cookie on `/`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: default_path(),
            expires: None,
            secure: false,
            same_site: SameSite::default(),
        }
    }

    /// Create a cookie carrying the attributes of a storage policy.
    #[must_use]
    pub fn with_policy(
        name: impl Into<String>,
        value: impl Into<String>,
        policy: &StoragePolicy,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(name, value)
            .with_expires(policy.expires_at(now))
            .with_secure(policy.secure)
            .with_same_site(policy.same_site)
    }

    /// Set the expiration.
    #[must_use]
    pub const fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set Secure flag.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set SameSite attribute.
    #[must_use]
    pub const fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Check if the cookie has expired at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|exp| exp <= now)
    }

    /// The value as it goes on the wire, percent-encoded where needed.
    #[must_use]
    pub fn encoded_value(&self) -> String {
        utf8_percent_encode(&self.value, COOKIE_VALUE_ENCODE_SET).to_string()
    }

    /// Format for Cookie header.
    #[must_use]
    pub fn to_cookie_header(&self) -> String {
        format!("{}={}", self.name, self.encoded_value())
    }

    /// Format as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_set_cookie_header(&self) -> String {
        let mut header = format!("{}={}; Path={}", self.name, self.encoded_value(), self.path);
        if let Some(expires) = self.expires {
            header.push_str("; Expires=");
            header.push_str(&expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string());
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header.push_str("; SameSite=");
        header.push_str(self.same_site.display_name());
        header
    }
}

/// SameSite attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Cookies are sent with all requests.
    None,
    /// Cookies are sent with top-level navigations and GET from third-party sites.
    #[default]
    Lax,
    /// Cookies are only sent in first-party context.
    Strict,
}

impl SameSite {
    /// Get human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

/// Cookie jar keyed by cookie name.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CookieJar {
    #[serde(default)]
    cookies: BTreeMap<String, Cookie>,
}

impl CookieJar {
    /// Create a new empty cookie jar.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cookies: BTreeMap::new(),
        }
    }

    /// Add or replace a cookie.
    pub fn add(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    /// Get a live cookie by name. Expired cookies read as absent.
    #[must_use]
    pub fn get(&self, name: &str, now: DateTime<Utc>) -> Option<&Cookie> {
        self.cookies.get(name).filter(|c| !c.is_expired_at(now))
    }

    /// Remove a cookie by name.
    pub fn remove(&mut self, name: &str) -> Option<Cookie> {
        self.cookies.remove(name)
    }

    /// Get all non-expired cookies.
    #[must_use]
    pub fn all_valid(&self, now: DateTime<Utc>) -> Vec<&Cookie> {
        self.cookies
            .values()
            .filter(|c| !c.is_expired_at(now))
            .collect()
    }

    /// Remove expired cookies.
    pub fn cleanup_expired(&mut self, now: DateTime<Utc>) {
        self.cookies.retain(|_, c| !c.is_expired_at(now));
    }

    /// Get the total number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if the jar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Build the Cookie header value from all live cookies.
    #[must_use]
    pub fn cookie_header(&self, now: DateTime<Utc>) -> Option<String> {
        let cookies = self.all_valid(now);
        if cookies.is_empty() {
            return None;
        }

        let header_value: Vec<String> = cookies.iter().map(|c| c.to_cookie_header()).collect();
        Some(header_value.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cookie_new() {
        let cookie = Cookie::new("session", "abc123");
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.expires, None);
    }

    #[test]
    fn test_cookie_expired() {
        let now = Utc::now();
        let cookie = Cookie::new("test", "value").with_expires(now - Duration::hours(1));
        assert!(cookie.is_expired_at(now));

        let cookie = Cookie::new("test", "value").with_expires(now + Duration::hours(1));
        assert!(!cookie.is_expired_at(now));
    }

    #[test]
    fn test_cookie_with_policy() {
        let now = Utc::now();
        let cookie = Cookie::with_policy("access_token", "T", &StoragePolicy::access(), now);
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, SameSite::Strict);
        assert_eq!(cookie.expires, Some(now + Duration::days(7)));
    }

    #[test]
    fn test_set_cookie_header() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).single();
        let mut cookie = Cookie::new("refresh_token", "R")
            .with_secure(true)
            .with_same_site(SameSite::Strict);
        cookie.expires = expires;
        assert_eq!(
            cookie.to_set_cookie_header(),
            "refresh_token=R; Path=/; Expires=Wed, 02 Jan 2030 03:04:05 GMT; Secure; SameSite=Strict"
        );
    }

    #[test]
    fn test_unsafe_value_is_percent_encoded() {
        let cookie = Cookie::new("access_token", "a b;c,d\"e%f\\g\u{e9}").with_secure(true);
        assert_eq!(cookie.encoded_value(), "a%20b%3Bc%2Cd%22e%25f%5Cg%C3%A9");
        assert_eq!(
            cookie.to_set_cookie_header(),
            "access_token=a%20b%3Bc%2Cd%22e%25f%5Cg%C3%A9; Path=/; Secure; SameSite=Lax"
        );
        assert_eq!(cookie.value, "a b;c,d\"e%f\\g\u{e9}");
    }

    #[test]
    fn test_token_value_is_sent_verbatim() {
        let cookie = Cookie::new("access_token", "eyJhbGciOi.J9-_x/+=");
        assert_eq!(cookie.to_cookie_header(), "access_token=eyJhbGciOi.J9-_x/+=");
    }

    #[test]
    fn test_cookie_jar_add_get_remove() {
        let now = Utc::now();
        let mut jar = CookieJar::new();

        jar.add(Cookie::new("session", "abc"));
        jar.add(Cookie::new("session", "def"));
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("session", now).map(|c| c.value.as_str()), Some("def"));

        jar.remove("session");
        assert!(jar.is_empty());
    }

    #[test]
    fn test_cookie_jar_hides_expired() {
        let now = Utc::now();
        let mut jar = CookieJar::new();
        jar.add(Cookie::new("old", "1").with_expires(now - Duration::seconds(1)));
        jar.add(Cookie::new("new", "2").with_expires(now + Duration::days(1)));

        assert!(jar.get("old", now).is_none());
        assert_eq!(jar.cookie_header(now).as_deref(), Some("new=2"));

        jar.cleanup_expired(now);
        assert_eq!(jar.len(), 1);
    }
}
