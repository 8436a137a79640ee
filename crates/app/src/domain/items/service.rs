//! Items service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    cache::TieredCache,
    domain::items::{
        errors::ItemsServiceError,
        models::{Item, ItemUpdate, ItemUuid, NewItem},
        publisher::{ChangeAction, ChangePublisher},
        store::ItemStore,
    },
};

/// Owns item records and the authoritative stock counter.
///
/// Reads walk the cache tiers before the primary store. Writes hit the
/// primary store and the publisher first; cache tiers only ever get a
/// best-effort mirror.
pub struct ItemStockManager {
    primary: Arc<dyn ItemStore>,
    tiers: TieredCache<ItemUuid, Item>,
    publisher: Arc<dyn ChangePublisher>,
}

impl ItemStockManager {
    #[must_use]
    pub fn new(
        primary: Arc<dyn ItemStore>,
        tiers: TieredCache<ItemUuid, Item>,
        publisher: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self {
            primary,
            tiers,
            publisher,
        }
    }
}

impl std::fmt::Debug for ItemStockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStockManager")
            .field("tiers", &self.tiers)
            .finish_non_exhaustive()
    }
}

fn require_id(item: ItemUuid) -> Result<(), ItemsServiceError> {
    if item.is_nil() {
        return Err(ItemsServiceError::Validation("item id is required"));
    }

    Ok(())
}

fn require_quantity(quantity: u32) -> Result<(), ItemsServiceError> {
    if quantity == 0 {
        return Err(ItemsServiceError::Validation("quantity must be positive"));
    }

    Ok(())
}

#[async_trait]
impl ItemsService for ItemStockManager {
    async fn get_item(&self, item: ItemUuid) -> Result<Item, ItemsServiceError> {
        require_id(item)?;

        let primary = &self.primary;

        self.tiers
            .read_through(&item, || async move {
                primary
                    .get_by_id(item)
                    .await
                    .map_err(|e| ItemsServiceError::from_store(item, e))
            })
            .await
    }

    async fn create_item(&self, item: NewItem) -> Result<Item, ItemsServiceError> {
        require_id(item.uuid)?;
        item.details
            .validate()
            .map_err(ItemsServiceError::Validation)?;

        let uuid = item.uuid;
        let now = Timestamp::now();

        let created = self
            .primary
            .create(item.details.into_item(uuid, now, now))
            .await
            .map_err(|e| ItemsServiceError::from_store(uuid, e))?;

        self.publisher.publish(ChangeAction::Create, uuid).await?;

        self.tiers.write_through(&uuid, &created).await;

        info!(item = %uuid, stock = created.stock, "item created");

        Ok(created)
    }

    async fn update_item(
        &self,
        uuid: ItemUuid,
        update: ItemUpdate,
    ) -> Result<Item, ItemsServiceError> {
        require_id(uuid)?;
        update.validate().map_err(ItemsServiceError::Validation)?;

        let existing = self
            .primary
            .get_by_id(uuid)
            .await
            .map_err(|e| ItemsServiceError::from_store(uuid, e))?;

        let updated = self
            .primary
            .update(
                uuid,
                update.into_item(uuid, existing.created_at, Timestamp::now()),
            )
            .await
            .map_err(|e| ItemsServiceError::from_store(uuid, e))?;

        self.publisher.publish(ChangeAction::Update, uuid).await?;

        self.tiers.write_through(&uuid, &updated).await;

        info!(item = %uuid, "item updated");

        Ok(updated)
    }

    async fn delete_item(&self, uuid: ItemUuid) -> Result<(), ItemsServiceError> {
        require_id(uuid)?;

        self.tiers.evict(&uuid).await;

        self.publisher.publish(ChangeAction::Delete, uuid).await?;

        self.primary
            .delete(uuid)
            .await
            .map_err(|e| ItemsServiceError::from_store(uuid, e))?;

        info!(item = %uuid, "item deleted");

        Ok(())
    }

    async fn decrement_stock_atomic(
        &self,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<bool, ItemsServiceError> {
        require_id(item)?;
        require_quantity(quantity)?;

        let decremented = self
            .primary
            .decrement_stock_atomic(item, quantity)
            .await
            .map_err(|e| ItemsServiceError::from_store(item, e))?;

        // A refused decrement usually means a cached copy overstated stock.
        self.tiers.evict(&item).await;

        if !decremented {
            warn!(%item, quantity, "conditional stock decrement refused");
        }

        Ok(decremented)
    }

    async fn increment_stock(&self, item: ItemUuid, quantity: u32) -> Result<(), ItemsServiceError> {
        require_id(item)?;
        require_quantity(quantity)?;

        self.primary
            .increment_stock(item, quantity)
            .await
            .map_err(|e| ItemsServiceError::from_store(item, e))?;

        self.tiers.evict(&item).await;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ItemsService: Send + Sync {
    /// Retrieve a single item, nearest cache tier first.
    async fn get_item(&self, item: ItemUuid) -> Result<Item, ItemsServiceError>;

    /// Creates a new item and announces it.
    async fn create_item(&self, item: NewItem) -> Result<Item, ItemsServiceError>;

    /// Replaces an item's editable fields and announces the change.
    async fn update_item(
        &self,
        uuid: ItemUuid,
        update: ItemUpdate,
    ) -> Result<Item, ItemsServiceError>;

    /// Deletes an item and announces it.
    async fn delete_item(&self, uuid: ItemUuid) -> Result<(), ItemsServiceError>;

    /// Subtract `quantity` only if at least that much stock remains.
    ///
    /// `Ok(false)` means stock was insufficient and nothing changed.
    async fn decrement_stock_atomic(
        &self,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<bool, ItemsServiceError>;

    /// Return `quantity` to stock.
    async fn increment_stock(&self, item: ItemUuid, quantity: u32) -> Result<(), ItemsServiceError>;
}
