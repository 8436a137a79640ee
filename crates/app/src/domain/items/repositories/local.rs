//! In-process item cache.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    cache::LocalCache,
    domain::items::{
        models::{Item, ItemUuid},
        store::ItemStore,
    },
    store::StoreError,
};

#[derive(Debug)]
pub struct LocalItemStore {
    cache: LocalCache<ItemUuid, Item>,
}

impl LocalItemStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: LocalCache::new(ttl),
        }
    }
}

#[async_trait]
impl ItemStore for LocalItemStore {
    async fn get_by_id(&self, item: ItemUuid) -> Result<Item, StoreError> {
        self.cache.get(&item).await.ok_or(StoreError::NotFound)
    }

    async fn create(&self, item: Item) -> Result<Item, StoreError> {
        self.cache.insert(item.uuid, item.clone()).await;

        Ok(item)
    }

    async fn update(&self, uuid: ItemUuid, mut item: Item) -> Result<Item, StoreError> {
        item.uuid = uuid;

        self.cache.insert(uuid, item.clone()).await;

        Ok(item)
    }

    async fn delete(&self, item: ItemUuid) -> Result<(), StoreError> {
        self.cache
            .remove(&item)
            .await
            .map(drop)
            .ok_or(StoreError::NotFound)
    }

    async fn decrement_stock_atomic(
        &self,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<bool, StoreError> {
        self.cache
            .modify(&item, |cached| {
                let Some(remaining) = cached.stock.checked_sub(quantity) else {
                    return false;
                };

                cached.stock = remaining;

                true
            })
            .await
            .ok_or(StoreError::NotFound)
    }

    async fn increment_stock(&self, item: ItemUuid, quantity: u32) -> Result<(), StoreError> {
        self.cache
            .modify(&item, |cached| {
                cached.stock = u32::try_from(u64::from(cached.stock) + u64::from(quantity))
                    .map_err(|e| StoreError::OutOfRange("stock", e))?;

                Ok(())
            })
            .await
            .ok_or(StoreError::NotFound)?
    }
}
