//! In-process cart cache.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    cache::LocalCache,
    customers::CustomerId,
    domain::carts::{models::Cart, store::CartStore},
    store::StoreError,
};

#[derive(Debug)]
pub struct LocalCartStore {
    cache: LocalCache<CustomerId, Cart>,
}

impl LocalCartStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: LocalCache::new(ttl),
        }
    }
}

#[async_trait]
impl CartStore for LocalCartStore {
    async fn get_by_customer_id(&self, customer: CustomerId) -> Result<Cart, StoreError> {
        self.cache.get(&customer).await.ok_or(StoreError::NotFound)
    }

    async fn create(&self, cart: Cart) -> Result<Cart, StoreError> {
        if !self.cache.try_insert(cart.customer_id, cart.clone()).await {
            return Err(StoreError::Conflict);
        }

        Ok(cart)
    }

    async fn update(&self, cart: Cart) -> Result<Cart, StoreError> {
        let replacement = cart.clone();

        self.cache
            .modify(&cart.customer_id, |stored| {
                stored.items = replacement.items;
                stored.total = replacement.total;
                stored.updated_at = replacement.updated_at;

                stored.clone()
            })
            .await
            .ok_or(StoreError::NotFound)
    }

    async fn upsert(&self, cart: Cart) -> Result<Cart, StoreError> {
        self.cache.insert(cart.customer_id, cart.clone()).await;

        Ok(cart)
    }

    async fn delete(&self, customer: CustomerId) -> Result<(), StoreError> {
        self.cache
            .remove(&customer)
            .await
            .map(drop)
            .ok_or(StoreError::NotFound)
    }
}
