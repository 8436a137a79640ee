//! Sale store contract.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    cache::CacheTier,
    customers::CustomerId,
    domain::sales::models::{Sale, SaleUuid},
    store::StoreError,
};

#[automock]
#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn create(&self, sale: Sale) -> Result<Sale, StoreError>;

    async fn get_by_id(&self, sale: SaleUuid) -> Result<Sale, StoreError>;

    /// Oldest first. Cache tiers cannot answer this.
    async fn get_by_customer_id(&self, customer: CustomerId) -> Result<Vec<Sale>, StoreError>;

    async fn update(&self, sale: Sale) -> Result<Sale, StoreError>;

    async fn delete(&self, sale: SaleUuid) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CacheTier<SaleUuid, Sale> for S
where
    S: SaleStore + ?Sized,
{
    async fn fetch(&self, key: &SaleUuid) -> Result<Option<Sale>, StoreError> {
        match self.get_by_id(*key).await {
            Ok(sale) => Ok(Some(sale)),
            Err(StoreError::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn fill(&self, value: &Sale) -> Result<(), StoreError> {
        self.create(value.clone()).await.map(drop)
    }

    async fn evict(&self, key: &SaleUuid) -> Result<(), StoreError> {
        match self.delete(*key).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(error) => Err(error),
        }
    }
}
