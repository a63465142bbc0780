//! Expiring in-memory map backing the session store and the OAuth state tracker.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// HashMap behind an async RwLock where every entry lives for a fixed TTL.
///
/// Expired entries are dropped lazily on access and in bulk by
/// [`purge_expired`](Self::purge_expired). Data is lost on process restart.
pub struct ExpiringMap<V> {
    store: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ExpiringMap<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert or overwrite `key`, restarting its TTL.
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let expires_at = Instant::now() + self.ttl;
        let mut store = self.store.write().await;
        store.insert(key.into(), CacheEntry { value, expires_at });
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if !entry.is_expired(Instant::now()) {
            return Some(entry.value.clone());
        }
        drop(store);

        // Re-check under the write lock; the key may have been rewritten meanwhile.
        let mut store = self.store.write().await;
        if store
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()))
        {
            store.remove(key);
        }
        None
    }

    /// Remove `key`, returning its value only if it had not yet expired.
    pub async fn remove(&self, key: &str) -> Option<V> {
        let mut store = self.store.write().await;
        let entry = store.remove(key)?;

        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value)
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        before - store.len()
    }

    /// Number of entries held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
