//! Process-wide expiring key/value cache backing one-time codes.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("ttl of {0:?} overflows the clock")]
    TtlOutOfRange(Duration),
}

/// Key/value store with per-entry time-to-live.
pub trait TtlCache: Send + Sync {
    /// Stores `value` under `key` unless a live entry already holds the key.
    /// Returns `false` on collision.
    fn put(&self, key: String, value: String, ttl: Duration) -> Result<bool, CacheError>;

    fn get(&self, key: &str) -> Option<String>;

    /// Atomically removes and returns a live entry. Of several concurrent
    /// callers for the same key, at most one receives the value.
    fn take(&self, key: &str) -> Option<String>;

    /// Drops every expired entry, returning how many were removed.
    fn purge_expired(&self) -> usize;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TtlCache for MemoryCache {
    fn put(&self, key: String, value: String, ttl: Duration) -> Result<bool, CacheError> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or(CacheError::TtlOutOfRange(ttl))?;
        let entry = CacheEntry { value, expires_at };

        let stored = match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(entry);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        };
        Ok(stored)
    }

    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    fn take(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        if let Some((_, entry)) = self.entries.remove_if(key, |_, e| !e.is_expired(now)) {
            return Some(entry.value);
        }
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        None
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

/// Periodically purges expired entries until the returned task is aborted.
pub fn spawn_sweeper(cache: Arc<dyn TtlCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.purge_expired();
            if removed > 0 {
                debug!(removed, "Purged expired cache entries");
            }
        }
    })
}
