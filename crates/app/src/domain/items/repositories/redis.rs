//! Distributed item cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    domain::items::{
        models::{Item, ItemUuid},
        store::ItemStore,
    },
    store::StoreError,
};

const TIER: &str = "redis";

/// JSON-encoded items under `item:{uuid}`, each written with a TTL.
#[derive(Clone)]
pub struct RedisItemStore {
    connection: ConnectionManager,
    ttl: Duration,
}

impl RedisItemStore {
    #[must_use]
    pub fn new(connection: ConnectionManager, ttl: Duration) -> Self {
        Self { connection, ttl }
    }

    fn key(item: ItemUuid) -> String {
        format!("item:{item}")
    }

    async fn put(&self, item: &Item) -> Result<(), StoreError> {
        let payload = serde_json::to_string(item)?;
        let mut connection = self.connection.clone();

        let () = connection
            .set_ex(Self::key(item.uuid), payload, self.ttl.as_secs().max(1))
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ItemStore for RedisItemStore {
    async fn get_by_id(&self, item: ItemUuid) -> Result<Item, StoreError> {
        let mut connection = self.connection.clone();
        let payload: Option<String> = connection.get(Self::key(item)).await?;

        let payload = payload.ok_or(StoreError::NotFound)?;

        Ok(serde_json::from_str(&payload)?)
    }

    async fn create(&self, item: Item) -> Result<Item, StoreError> {
        self.put(&item).await?;

        Ok(item)
    }

    async fn update(&self, uuid: ItemUuid, mut item: Item) -> Result<Item, StoreError> {
        item.uuid = uuid;

        self.put(&item).await?;

        Ok(item)
    }

    async fn delete(&self, item: ItemUuid) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let removed: u64 = connection.del(Self::key(item)).await?;

        if removed == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn decrement_stock_atomic(
        &self,
        _item: ItemUuid,
        _quantity: u32,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Unsupported(TIER))
    }

    async fn increment_stock(&self, _item: ItemUuid, _quantity: u32) -> Result<(), StoreError> {
        Err(StoreError::Unsupported(TIER))
    }
}
