//! Item store contract shared by the primary store and both cache tiers.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    cache::CacheTier,
    domain::items::models::{Item, ItemUuid},
    store::StoreError,
};

#[automock]
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_by_id(&self, item: ItemUuid) -> Result<Item, StoreError>;

    async fn create(&self, item: Item) -> Result<Item, StoreError>;

    async fn update(&self, uuid: ItemUuid, item: Item) -> Result<Item, StoreError>;

    async fn delete(&self, item: ItemUuid) -> Result<(), StoreError>;

    /// Subtract `quantity` only while `stock >= quantity`, as one conditional
    /// write. `Ok(false)` means the predicate did not hold and nothing changed.
    async fn decrement_stock_atomic(&self, item: ItemUuid, quantity: u32)
    -> Result<bool, StoreError>;

    /// Unconditionally add `quantity` back.
    async fn increment_stock(&self, item: ItemUuid, quantity: u32) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CacheTier<ItemUuid, Item> for S
where
    S: ItemStore + ?Sized,
{
    async fn fetch(&self, key: &ItemUuid) -> Result<Option<Item>, StoreError> {
        match self.get_by_id(*key).await {
            Ok(item) => Ok(Some(item)),
            Err(StoreError::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn fill(&self, value: &Item) -> Result<(), StoreError> {
        self.create(value.clone()).await.map(drop)
    }

    async fn evict(&self, key: &ItemUuid) -> Result<(), StoreError> {
        match self.delete(*key).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(error) => Err(error),
        }
    }
}
