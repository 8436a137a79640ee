//! In-process sale cache.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    cache::LocalCache,
    customers::CustomerId,
    domain::sales::{
        models::{Sale, SaleUuid},
        store::SaleStore,
    },
    store::StoreError,
};

const TIER: &str = "local";

#[derive(Debug)]
pub struct LocalSaleStore {
    cache: LocalCache<SaleUuid, Sale>,
}

impl LocalSaleStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: LocalCache::new(ttl),
        }
    }
}

#[async_trait]
impl SaleStore for LocalSaleStore {
    async fn create(&self, sale: Sale) -> Result<Sale, StoreError> {
        self.cache.insert(sale.uuid, sale.clone()).await;

        Ok(sale)
    }

    async fn get_by_id(&self, sale: SaleUuid) -> Result<Sale, StoreError> {
        self.cache.get(&sale).await.ok_or(StoreError::NotFound)
    }

    async fn get_by_customer_id(&self, _customer: CustomerId) -> Result<Vec<Sale>, StoreError> {
        Err(StoreError::Unsupported(TIER))
    }

    async fn update(&self, sale: Sale) -> Result<Sale, StoreError> {
        self.cache.insert(sale.uuid, sale.clone()).await;

        Ok(sale)
    }

    async fn delete(&self, sale: SaleUuid) -> Result<(), StoreError> {
        self.cache
            .remove(&sale)
            .await
            .map(drop)
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn customer_lookup_is_unsupported() {
        let store = LocalSaleStore::new(Duration::from_secs(60));

        let result = store.get_by_customer_id(CustomerId::new(1)).await;

        assert!(
            matches!(result, Err(StoreError::Unsupported("local"))),
            "expected Unsupported, got {result:?}"
        );
    }
}
