//! Tier ordering policy.
//!
//! Tiers are consulted in insertion order, nearest first. The primary store
//! is never a tier: callers hand it to [`TieredCache::read_through`] as the
//! loader of last resort.

use std::{fmt::Display, future::Future, sync::Arc};

use tracing::{debug, warn};

use super::CacheTier;

struct Tier<K, V> {
    name: &'static str,
    cache: Arc<dyn CacheTier<K, V>>,
}

pub struct TieredCache<K, V> {
    tiers: Vec<Tier<K, V>>,
}

impl<K, V> std::fmt::Debug for TieredCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tiers.iter().map(|tier| tier.name))
            .finish()
    }
}

impl<K, V> Default for TieredCache<K, V> {
    fn default() -> Self {
        Self { tiers: Vec::new() }
    }
}

impl<K, V> TieredCache<K, V>
where
    K: Display + Send + Sync,
    V: Send + Sync,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tier behind the ones already registered.
    #[must_use]
    pub fn with_tier(mut self, name: &'static str, cache: Arc<dyn CacheTier<K, V>>) -> Self {
        self.tiers.push(Tier { name, cache });
        self
    }

    /// Walk the tiers nearest first. A hit short-circuits and back-fills every
    /// tier above it; a full miss calls `load` and back-fills all tiers. A tier
    /// that fails to answer is treated as a miss.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` returns. Tier failures are never surfaced.
    pub async fn read_through<E, F, Fut>(&self, key: &K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send,
    {
        for (depth, tier) in self.tiers.iter().enumerate() {
            match tier.cache.fetch(key).await {
                Ok(Some(value)) => {
                    debug!(tier = tier.name, %key, "cache hit");

                    self.back_fill(depth, &value).await;

                    return Ok(value);
                }
                Ok(None) => debug!(tier = tier.name, %key, "cache miss"),
                Err(source) => {
                    warn!(tier = tier.name, %key, error = %source, "cache read failed, falling through");
                }
            }
        }

        let value = load().await?;

        self.back_fill(self.tiers.len(), &value).await;

        Ok(value)
    }

    /// Mirror a freshly written value into every tier.
    pub async fn write_through(&self, key: &K, value: &V) {
        self.back_fill(self.tiers.len(), value).await;

        debug!(%key, "cache tiers written");
    }

    /// Drop `key` from every tier.
    pub async fn evict(&self, key: &K) {
        for tier in &self.tiers {
            if let Err(source) = tier.cache.evict(key).await {
                warn!(tier = tier.name, %key, error = %source, "cache eviction failed");
            }
        }
    }

    async fn back_fill(&self, depth: usize, value: &V) {
        for tier in self.tiers.iter().take(depth).rev() {
            if let Err(source) = tier.cache.fill(value).await {
                warn!(tier = tier.name, error = %source, "cache write failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use testresult::TestResult;

    use crate::{cache::LocalCache, store::StoreError};

    use super::*;

    #[derive(Debug)]
    struct Counter(LocalCache<u32, (u32, &'static str)>);

    #[async_trait]
    impl CacheTier<u32, (u32, &'static str)> for Counter {
        async fn fetch(&self, key: &u32) -> Result<Option<(u32, &'static str)>, StoreError> {
            Ok(self.0.get(key).await)
        }

        async fn fill(&self, value: &(u32, &'static str)) -> Result<(), StoreError> {
            self.0.insert(value.0, *value).await;
            Ok(())
        }

        async fn evict(&self, key: &u32) -> Result<(), StoreError> {
            self.0.remove(key).await;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    #[async_trait]
    impl CacheTier<u32, (u32, &'static str)> for Broken {
        async fn fetch(&self, _key: &u32) -> Result<Option<(u32, &'static str)>, StoreError> {
            Err(StoreError::Unsupported("broken"))
        }

        async fn fill(&self, _value: &(u32, &'static str)) -> Result<(), StoreError> {
            Err(StoreError::Unsupported("broken"))
        }

        async fn evict(&self, _key: &u32) -> Result<(), StoreError> {
            Err(StoreError::Unsupported("broken"))
        }
    }

    type Tiers = TieredCache<u32, (u32, &'static str)>;

    fn counter() -> Arc<Counter> {
        Arc::new(Counter(LocalCache::new(Duration::from_secs(60))))
    }

    #[tokio::test]
    async fn full_miss_loads_once_and_fills_every_tier() -> TestResult {
        let near = counter();
        let far = counter();
        let loads = AtomicUsize::new(0);

        let tiers = Tiers::new()
            .with_tier("near", near.clone())
            .with_tier("far", far.clone());

        let value = tiers
            .read_through(&1, || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StoreError>((1, "primary"))
            })
            .await?;

        assert_eq!(value, (1, "primary"));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(near.0.get(&1).await, Some((1, "primary")));
        assert_eq!(far.0.get(&1).await, Some((1, "primary")));

        Ok(())
    }

    #[tokio::test]
    async fn far_hit_fills_only_the_nearer_tier() -> TestResult {
        let near = counter();
        let far = counter();

        far.0.insert(1, (1, "far")).await;

        let tiers = Tiers::new()
            .with_tier("near", near.clone())
            .with_tier("far", far.clone());

        let value = tiers
            .read_through(&1, || async { Err::<_, StoreError>(StoreError::NotFound) })
            .await?;

        assert_eq!(value, (1, "far"));
        assert_eq!(near.0.get(&1).await, Some((1, "far")));

        Ok(())
    }

    #[tokio::test]
    async fn failing_tier_falls_through_to_the_loader() -> TestResult {
        let tiers = Tiers::new().with_tier("broken", Arc::new(Broken));

        let value = tiers
            .read_through(&9, || async { Ok::<_, StoreError>((9, "primary")) })
            .await?;

        assert_eq!(value, (9, "primary"));

        Ok(())
    }

    #[tokio::test]
    async fn loader_errors_propagate() {
        let tiers = Tiers::new().with_tier("near", counter());

        let result = tiers
            .read_through(&3, || async { Err::<(u32, &str), _>(StoreError::NotFound) })
            .await;

        assert!(
            matches!(result, Err(StoreError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn evict_clears_every_tier_and_tolerates_failures() {
        let near = counter();

        near.0.insert(4, (4, "near")).await;

        let tiers = Tiers::new()
            .with_tier("near", near.clone())
            .with_tier("broken", Arc::new(Broken));

        tiers.evict(&4).await;

        assert_eq!(near.0.get(&4).await, None);
    }
}
