//! Cache tiers
//!
//! Every cache adapter is also a full store adapter; [`CacheTier`] is the
//! narrow view of one that the read-through policy needs.

use async_trait::async_trait;

use crate::store::StoreError;

mod local;
mod tiers;

pub use local::LocalCache;
pub use tiers::TieredCache;

/// Key/value view of a cache tier.
#[async_trait]
pub trait CacheTier<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// `Ok(None)` is a miss.
    async fn fetch(&self, key: &K) -> Result<Option<V>, StoreError>;

    /// Insert or overwrite the entry for `value`.
    async fn fill(&self, value: &V) -> Result<(), StoreError>;

    /// Drop the entry. Evicting an absent key is not an error.
    async fn evict(&self, key: &K) -> Result<(), StoreError>;
}
