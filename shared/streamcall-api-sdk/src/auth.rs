//! Auth token storage
//!
//! The browser front-end kept the bearer token in a cookie with a seven day
//! lifetime and dropped it on any 401. `TokenStore` is that cookie jar.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Default token lifetime, in days
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Where the client reads its bearer token from
pub trait TokenStore: Send + Sync {
    /// Current token, `None` if absent or expired
    fn token(&self) -> Option<String>;

    fn store(&self, token: String, ttl: Duration);

    fn clear(&self);
}

#[derive(Debug, Clone)]
struct StoredToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `token` for the default lifetime
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.store(token.into(), Duration::days(DEFAULT_TOKEN_TTL_DAYS));
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        {
            let guard = self.inner.read();
            match guard.as_ref() {
                Some(stored) if stored.expires_at > Utc::now() => return Some(stored.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // expired
        self.clear();
        None
    }

    fn store(&self, token: String, ttl: Duration) {
        if token.is_empty() {
            self.clear();
            return;
        }
        *self.inner.write() = Some(StoredToken {
            value: token,
            expires_at: Utc::now() + ttl,
        });
    }

    fn clear(&self) {
        *self.inner.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_clear() {
        let store = MemoryTokenStore::with_token("secret");
        assert_eq!(store.token().as_deref(), Some("secret"));

        store.clear();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_expired_token_is_dropped() {
        let store = MemoryTokenStore::new();
        store.store("stale".to_string(), Duration::seconds(-1));
        assert!(store.token().is_none());
    }

    #[test]
    fn test_empty_token_not_stored() {
        let store = MemoryTokenStore::with_token("secret");
        store.store(String::new(), Duration::days(1));
        assert!(store.token().is_none());
    }
}
