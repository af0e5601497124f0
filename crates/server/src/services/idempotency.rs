//! Idempotency cache for side-effecting requests.
//!
//! Maps a client-supplied `Idempotency-Key` to the response that was produced
//! the first time, so a retransmitted request gets the same answer instead of
//! running again. Entries expire after a fixed TTL; expired entries are evicted
//! by the lookup that finds them, there is no background sweep.
//!
//! Bodies are copied on the way in and on the way out, so neither the caller
//! that stored a response nor one that replayed it can change what later
//! replays return.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// Source of the current time. Injectable so expiry can be tested.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A stored response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[derive(Debug)]
struct Entry {
    response: CachedResponse,
    created_at: DateTime<Utc>,
}

/// Time-bounded map from idempotency key to response.
#[derive(Clone)]
pub struct IdempotencyCache {
    inner: Arc<IdempotencyCacheInner>,
}

struct IdempotencyCacheInner {
    ttl: Duration,
    clock: Clock,
    entries: RwLock<HashMap<String, Entry>>,
}

impl std::fmt::Debug for IdempotencyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotencyCache")
            .field("ttl", &self.inner.ttl)
            .finish_non_exhaustive()
    }
}

impl IdempotencyCache {
    /// Create a cache using the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(Utc::now))
    }

    /// Create a cache with a custom clock.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self {
            inner: Arc::new(IdempotencyCacheInner {
                ttl,
                clock,
                entries: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Return a copy of the response stored under `key`.
    ///
    /// Misses for the empty key, unknown keys, and entries older than the TTL.
    /// An expired entry is removed as part of the lookup.
    pub async fn lookup(&self, key: &str) -> Option<CachedResponse> {
        if key.is_empty() {
            return None;
        }
        let now = (self.inner.clock)();

        {
            let entries = self.inner.entries.read().await;
            let entry = entries.get(key)?;
            if !self.is_expired(entry, now) {
                return Some(entry.response.clone());
            }
        }

        // Re-check under the write lock: a concurrent store may have refreshed it.
        let mut entries = self.inner.entries.write().await;
        match entries.get(key) {
            Some(entry) if self.is_expired(entry, now) => {
                entries.remove(key);
                debug!(key, "Evicted expired idempotency entry");
                None
            }
            Some(entry) => Some(entry.response.clone()),
            None => None,
        }
    }

    /// Store a copy of a response under `key`, replacing any previous entry
    /// and resetting its age. The empty key is ignored.
    pub async fn store(&self, key: &str, status: StatusCode, body: &[u8]) {
        if key.is_empty() {
            return;
        }
        let entry = Entry {
            response: CachedResponse {
                status,
                body: body.to_vec(),
            },
            created_at: (self.inner.clock)(),
        };
        self.inner
            .entries
            .write()
            .await
            .insert(key.to_owned(), entry);
    }

    /// Number of entries currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        // A negative age (clock stepped back) counts as fresh.
        (now - entry.created_at)
            .to_std()
            .is_ok_and(|age| age > self.inner.ttl)
    }
}
