use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pulse_common::Clock;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// A value served from the cache along with how old it is.
#[derive(Debug, Clone)]
pub struct CacheHit<V> {
    pub value: V,
    pub age: Duration,
}

/// Time-bounded map. Expiry is checked on read; nothing is swept.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn age_of(&self, entry: &CacheEntry<V>) -> Duration {
        (self.clock.now() - entry.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Fresh value for `key`. Entries at or past the TTL are misses.
    pub async fn get(&self, key: &str) -> Option<CacheHit<V>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        let age = self.age_of(entry);
        if age < self.ttl {
            Some(CacheHit {
                value: entry.value.clone(),
                age,
            })
        } else {
            None
        }
    }

    /// Store `value`, replacing any previous entry. Last write wins.
    pub async fn put(&self, key: impl Into<String>, value: V) {
        let stored_at = self.clock.now();
        let mut entries = self.entries.write().await;
        entries.insert(key.into(), CacheEntry { value, stored_at });
    }

    /// Look at an entry regardless of expiry without cloning it.
    pub async fn inspect<R>(&self, key: &str, f: impl FnOnce(&V) -> R) -> Option<(R, Duration)> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        Some((f(&entry.value), self.age_of(entry)))
    }
}
