//! Cart store contract shared by the primary store and the local cache.

use async_trait::async_trait;
use mockall::automock;

use crate::{cache::CacheTier, customers::CustomerId, domain::carts::models::Cart, store::StoreError};

#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get_by_customer_id(&self, customer: CustomerId) -> Result<Cart, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the customer already has a cart.
    async fn create(&self, cart: Cart) -> Result<Cart, StoreError>;

    async fn update(&self, cart: Cart) -> Result<Cart, StoreError>;

    /// Create or replace the customer's cart.
    async fn upsert(&self, cart: Cart) -> Result<Cart, StoreError>;

    async fn delete(&self, customer: CustomerId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CacheTier<CustomerId, Cart> for S
where
    S: CartStore + ?Sized,
{
    async fn fetch(&self, key: &CustomerId) -> Result<Option<Cart>, StoreError> {
        match self.get_by_customer_id(*key).await {
            Ok(cart) => Ok(Some(cart)),
            Err(StoreError::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn fill(&self, value: &Cart) -> Result<(), StoreError> {
        self.upsert(value.clone()).await.map(drop)
    }

    async fn evict(&self, key: &CustomerId) -> Result<(), StoreError> {
        match self.delete(*key).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(error) => Err(error),
        }
    }
}
