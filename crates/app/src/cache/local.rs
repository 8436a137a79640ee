//! In-process TTL map backing every local cache tier.

use std::{hash::Hash, time::Duration};

use rustc_hash::FxHashMap;
use tokio::{sync::RwLock, time::Instant};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug)]
struct Entries<K, V> {
    map: FxHashMap<K, Entry<V>>,
    next_sweep: Instant,
}

impl<K, V> Entries<K, V>
where
    K: Eq + Hash,
{
    /// Drop expired entries, at most once per `ttl`. Runs under the write
    /// lock of every write, so the map never holds more than the keys
    /// written during the last two TTLs.
    fn sweep(&mut self, now: Instant, ttl: Duration) {
        if now < self.next_sweep {
            return;
        }

        self.map.retain(|_, entry| entry.is_live(now));
        self.next_sweep = now + ttl;
    }
}

/// Short-lived in-process cache. Expired entries read as absent and are
/// swept out by later writes.
#[derive(Debug)]
pub struct LocalCache<K, V> {
    ttl: Duration,
    entries: RwLock<Entries<K, V>>,
}

impl<K, V> LocalCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(Entries {
                map: FxHashMap::default(),
                next_sweep: Instant::now() + ttl,
            }),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        entries
            .map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Insert or overwrite, restarting the entry's TTL.
    pub async fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.sweep(now, self.ttl);
        entries.map.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Insert only when no live entry exists. Returns whether it inserted.
    pub async fn try_insert(&self, key: K, value: V) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.sweep(now, self.ttl);

        if entries.map.get(&key).is_some_and(|entry| entry.is_live(now)) {
            return false;
        }

        entries.map.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );

        true
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.sweep(now, self.ttl);
        entries
            .map
            .remove(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
    }

    /// Mutate a live entry in place under the write lock. Returns `None`
    /// when the key is absent or expired; the TTL is left untouched.
    pub async fn modify<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.sweep(now, self.ttl);
        entries
            .map
            .get_mut(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| f(&mut entry.value))
    }

    /// Entries held, expired or not.
    #[cfg(test)]
    async fn stored(&self) -> usize {
        self.entries.read().await.map.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const TTL: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = LocalCache::new(TTL);

        cache.insert("a", 1).await;

        assert_eq!(cache.get(&"a").await, Some(1));

        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_restarts_ttl() {
        let cache = LocalCache::new(TTL);

        cache.insert("a", 1).await;
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.insert("a", 2).await;
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(cache.get(&"a").await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn modify_ignores_expired_entries() {
        let cache = LocalCache::new(TTL);

        cache.insert("a", 1).await;
        tokio::time::advance(TTL * 2).await;

        let modified = cache.modify(&"a", |value| *value += 1).await;

        assert!(modified.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn try_insert_replaces_only_expired_entries() {
        let cache = LocalCache::new(TTL);

        assert!(cache.try_insert("a", 1).await);
        assert!(!cache.try_insert("a", 2).await);

        tokio::time::advance(TTL).await;

        assert!(cache.try_insert("a", 3).await);
        assert_eq!(cache.get(&"a").await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn writes_sweep_expired_entries() {
        let cache = LocalCache::new(TTL);

        for key in 0..10_000_u32 {
            cache.insert(key, key).await;
        }

        tokio::time::advance(Duration::from_secs(60 * 60)).await;

        assert_eq!(cache.get(&0).await, None);
        assert_eq!(cache.stored().await, 10_000);

        cache.insert(10_000, 10_000).await;

        assert_eq!(cache.stored().await, 1);
        assert_eq!(cache.get(&10_000).await, Some(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_keeps_live_entries() {
        let cache = LocalCache::new(TTL);

        cache.insert("old", 1).await;
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.insert("new", 2).await;
        tokio::time::advance(Duration::from_secs(15)).await;

        cache.remove(&"missing").await;

        assert_eq!(cache.stored().await, 1);
        assert_eq!(cache.get(&"new").await, Some(2));
    }
}
