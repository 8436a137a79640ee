//! Sales service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{error, info, warn};

use crate::{
    cache::TieredCache,
    customers::CustomerId,
    domain::{
        items::{
            ItemsService,
            models::{Item, ItemUuid},
            stock::{self, apply_delta, give_back},
        },
        sales::{
            errors::SalesServiceError,
            models::{CustomerSummary, NewSale, Sale, SaleUpdate, SaleUuid},
            store::SaleStore,
        },
    },
};

/// Owns persisted sales. Creating or deleting a sale moves the item's stock
/// by exactly the sale's quantity.
pub struct SalesLedger {
    primary: Arc<dyn SaleStore>,
    tiers: TieredCache<SaleUuid, Sale>,
    items: Arc<dyn ItemsService>,
}

impl SalesLedger {
    #[must_use]
    pub fn new(
        primary: Arc<dyn SaleStore>,
        tiers: TieredCache<SaleUuid, Sale>,
        items: Arc<dyn ItemsService>,
    ) -> Self {
        Self {
            primary,
            tiers,
            items,
        }
    }

    /// Reverse a stock move of `from` to `to` units whose sale write failed.
    async fn undo_delta(&self, item: ItemUuid, from: u32, to: u32) {
        let restored = if to > from {
            give_back(self.items.as_ref(), item, to - from)
                .await
                .map(|()| true)
        } else {
            self.items.decrement_stock_atomic(item, from - to).await
        };

        match restored {
            Ok(true) => {}
            Ok(false) => error!(%item, from, to, "stock could not be re-taken"),
            Err(source) => error!(%item, from, to, error = %source, "stock restore failed"),
        }
    }
}

impl std::fmt::Debug for SalesLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesLedger")
            .field("tiers", &self.tiers)
            .finish_non_exhaustive()
    }
}

fn require_id(sale: SaleUuid) -> Result<(), SalesServiceError> {
    if sale.is_nil() {
        return Err(SalesServiceError::Validation("sale id is required"));
    }

    Ok(())
}

fn require_quantity(quantity: u32) -> Result<(), SalesServiceError> {
    if quantity == 0 {
        return Err(SalesServiceError::Validation("quantity must be positive"));
    }

    Ok(())
}

fn price_of(item: &Item, quantity: u32) -> Result<u64, SalesServiceError> {
    item.price
        .checked_mul(u64::from(quantity))
        .ok_or(SalesServiceError::Validation("total price is too large"))
}

#[async_trait]
impl SalesService for SalesLedger {
    async fn create_sale(&self, sale: NewSale) -> Result<Sale, SalesServiceError> {
        if sale.item.is_nil() {
            return Err(SalesServiceError::Validation("item id is required"));
        }

        if !sale.customer_id.is_valid() {
            return Err(SalesServiceError::Validation("customer id is required"));
        }

        require_quantity(sale.quantity)?;

        let item = self.items.get_item(sale.item).await?;
        let total_price = price_of(&item, sale.quantity)?;

        stock::take(self.items.as_ref(), &item, sale.quantity).await?;

        let record = Sale {
            uuid: SaleUuid::new(),
            item: item.uuid,
            customer_id: sale.customer_id,
            quantity: sale.quantity,
            total_price,
            sold_at: Timestamp::now(),
        };

        let created = match self.primary.create(record).await {
            Ok(created) => created,
            Err(source) => {
                if let Err(restore) = give_back(self.items.as_ref(), item.uuid, sale.quantity).await {
                    error!(
                        item = %item.uuid,
                        quantity = sale.quantity,
                        error = %restore,
                        "stock restore after failed sale write failed"
                    );
                }

                return Err(SalesServiceError::Store(source));
            }
        };

        self.tiers.write_through(&created.uuid, &created).await;

        info!(
            sale = %created.uuid,
            item = %created.item,
            customer = %created.customer_id,
            quantity = created.quantity,
            "sale created"
        );

        Ok(created)
    }

    async fn get_sale(&self, sale: SaleUuid) -> Result<Sale, SalesServiceError> {
        require_id(sale)?;

        let primary = &self.primary;

        self.tiers
            .read_through(&sale, || async move {
                primary
                    .get_by_id(sale)
                    .await
                    .map_err(|e| SalesServiceError::from_store(sale, e))
            })
            .await
    }

    async fn get_customer_sales(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Sale>, SalesServiceError> {
        if !customer.is_valid() {
            return Err(SalesServiceError::Validation("customer id is required"));
        }

        self.primary
            .get_by_customer_id(customer)
            .await
            .map_err(SalesServiceError::Store)
    }

    async fn customer_summary(
        &self,
        customer: CustomerId,
    ) -> Result<CustomerSummary, SalesServiceError> {
        let sales = self.get_customer_sales(customer).await?;

        Ok(CustomerSummary::new(customer, sales))
    }

    async fn update_sale(
        &self,
        uuid: SaleUuid,
        update: SaleUpdate,
    ) -> Result<Sale, SalesServiceError> {
        require_id(uuid)?;
        require_quantity(update.quantity)?;

        let original = self
            .primary
            .get_by_id(uuid)
            .await
            .map_err(|e| SalesServiceError::from_store(uuid, e))?;

        let item = self.items.get_item(original.item).await?;
        let total_price = price_of(&item, update.quantity)?;

        apply_delta(
            self.items.as_ref(),
            &item,
            original.quantity,
            update.quantity,
        )
        .await?;

        let updated = match self
            .primary
            .update(Sale {
                quantity: update.quantity,
                total_price,
                ..original.clone()
            })
            .await
        {
            Ok(updated) => updated,
            Err(source) => {
                self.undo_delta(item.uuid, original.quantity, update.quantity)
                    .await;

                return Err(SalesServiceError::from_store(uuid, source));
            }
        };

        self.tiers.write_through(&uuid, &updated).await;

        info!(
            sale = %uuid,
            from = original.quantity,
            to = updated.quantity,
            "sale updated"
        );

        Ok(updated)
    }

    async fn delete_sale(&self, uuid: SaleUuid) -> Result<(), SalesServiceError> {
        require_id(uuid)?;

        let sale = self
            .primary
            .get_by_id(uuid)
            .await
            .map_err(|e| SalesServiceError::from_store(uuid, e))?;

        give_back(self.items.as_ref(), sale.item, sale.quantity).await?;

        self.tiers.evict(&uuid).await;

        if let Err(source) = self.primary.delete(uuid).await {
            warn!(sale = %uuid, error = %source, "sale delete failed, taking stock back");

            self.undo_delta(sale.item, sale.quantity, 0).await;

            return Err(SalesServiceError::from_store(uuid, source));
        }

        info!(sale = %uuid, item = %sale.item, quantity = sale.quantity, "sale deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait SalesService: Send + Sync {
    /// Records a sale, taking its quantity out of stock.
    async fn create_sale(&self, sale: NewSale) -> Result<Sale, SalesServiceError>;

    /// Retrieve a single sale.
    async fn get_sale(&self, sale: SaleUuid) -> Result<Sale, SalesServiceError>;

    /// Every sale of a customer, oldest first. Empty when there are none.
    async fn get_customer_sales(&self, customer: CustomerId)
    -> Result<Vec<Sale>, SalesServiceError>;

    /// A customer's sales with count and amount spent.
    async fn customer_summary(
        &self,
        customer: CustomerId,
    ) -> Result<CustomerSummary, SalesServiceError>;

    /// Change a sale's quantity, moving only the difference in stock.
    async fn update_sale(&self, uuid: SaleUuid, update: SaleUpdate)
    -> Result<Sale, SalesServiceError>;

    /// Deletes a sale, returning its quantity to stock.
    async fn delete_sale(&self, uuid: SaleUuid) -> Result<(), SalesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::items::{ItemsServiceError, models::ItemDetails, stock::Shortfall},
        test::{TestContext, helpers::lamp},
    };

    use super::*;

    const CUSTOMER: CustomerId = CustomerId::new(7);

    fn new_sale(item: &Item, quantity: u32) -> NewSale {
        NewSale {
            item: item.uuid,
            customer_id: CUSTOMER,
            quantity,
        }
    }

    #[tokio::test]
    async fn create_sale_snapshots_price_and_takes_stock() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(5)).await?;

        let sale = ctx.sales.create_sale(new_sale(&item, 2)).await?;

        assert_eq!(sale.quantity, 2);
        assert_eq!(sale.total_price, item.price * 2);
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 3);
        assert_eq!(ctx.sale_local.get_by_id(sale.uuid).await?, sale);

        Ok(())
    }

    #[tokio::test]
    async fn create_sale_rejects_missing_fields_before_any_write() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(5)).await?;

        for sale in [
            NewSale {
                quantity: 0,
                ..new_sale(&item, 1)
            },
            NewSale {
                customer_id: CustomerId::new(0),
                ..new_sale(&item, 1)
            },
            NewSale {
                item: crate::domain::items::models::ItemUuid::from_uuid(uuid::Uuid::nil()),
                ..new_sale(&item, 1)
            },
        ] {
            let result = ctx.sales.create_sale(sale).await;

            assert!(
                matches!(result, Err(SalesServiceError::Validation(_))),
                "expected Validation, got {result:?}"
            );
        }

        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 5);

        Ok(())
    }

    #[tokio::test]
    async fn create_sale_over_stock_is_insufficient() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(1)).await?;

        let result = ctx.sales.create_sale(new_sale(&item, 2)).await;

        assert!(
            matches!(
                result,
                Err(SalesServiceError::InsufficientStock(Shortfall {
                    requested: 2,
                    available: 1,
                    ..
                }))
            ),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 1);

        Ok(())
    }

    #[tokio::test]
    async fn create_sale_for_missing_item_is_not_found() {
        let ctx = TestContext::new();

        let result = ctx
            .sales
            .create_sale(NewSale {
                item: crate::domain::items::models::ItemUuid::new(),
                customer_id: CUSTOMER,
                quantity: 1,
            })
            .await;

        assert!(
            matches!(result, Err(SalesServiceError::Item(ItemsServiceError::NotFound(_)))),
            "expected item NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn failed_sale_write_restores_stock() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(5)).await?;

        ctx.sale_primary.fail_writes(true);

        let result = ctx.sales.create_sale(new_sale(&item, 2)).await;

        assert!(
            matches!(result, Err(SalesServiceError::Store(_))),
            "expected Store, got {result:?}"
        );
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 5);

        Ok(())
    }

    #[tokio::test]
    async fn create_then_delete_restores_stock() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(5)).await?;

        for quantity in 1..=5 {
            let sale = ctx.sales.create_sale(new_sale(&item, quantity)).await?;

            ctx.sales.delete_sale(sale.uuid).await?;

            assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 5);
        }

        Ok(())
    }

    #[tokio::test]
    async fn failed_sale_delete_takes_stock_back() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(5)).await?;
        let sale = ctx.sales.create_sale(new_sale(&item, 2)).await?;

        ctx.sale_primary.fail_writes(true);

        let result = ctx.sales.delete_sale(sale.uuid).await;

        assert!(
            matches!(result, Err(SalesServiceError::Store(_))),
            "expected Store, got {result:?}"
        );
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 3);
        assert_eq!(ctx.sales.get_sale(sale.uuid).await?.quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_sale_is_not_found() {
        let ctx = TestContext::new();

        let result = ctx.sales.delete_sale(SaleUuid::new()).await;

        assert!(
            matches!(result, Err(SalesServiceError::NotFound(_))),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn deleted_sale_is_gone_from_every_tier() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(5)).await?;
        let sale = ctx.sales.create_sale(new_sale(&item, 1)).await?;

        ctx.sales.delete_sale(sale.uuid).await?;

        let result = ctx.sales.get_sale(sale.uuid).await;

        assert!(
            matches!(result, Err(SalesServiceError::NotFound(_))),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_sale_moves_only_the_delta_and_reprices() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(10)).await?;
        let sale = ctx.sales.create_sale(new_sale(&item, 2)).await?;

        ctx.items
            .update_item(
                item.uuid,
                ItemDetails {
                    price: 3_00,
                    stock: 8,
                    ..lamp(0).details
                },
            )
            .await?;

        let updated = ctx
            .sales
            .update_sale(sale.uuid, SaleUpdate { quantity: 5 })
            .await?;

        assert_eq!(updated.total_price, 15_00);
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 5);

        let updated = ctx
            .sales
            .update_sale(sale.uuid, SaleUpdate { quantity: 1 })
            .await?;

        assert_eq!(updated.total_price, 3_00);
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 9);

        Ok(())
    }

    #[tokio::test]
    async fn update_sale_beyond_stock_leaves_everything_unchanged() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(3)).await?;
        let sale = ctx.sales.create_sale(new_sale(&item, 2)).await?;

        let result = ctx
            .sales
            .update_sale(sale.uuid, SaleUpdate { quantity: 4 })
            .await;

        assert!(
            matches!(result, Err(SalesServiceError::InsufficientStock(_))),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 1);
        assert_eq!(ctx.sales.get_sale(sale.uuid).await?.quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn failed_sale_update_puts_stock_back() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(10)).await?;
        let sale = ctx.sales.create_sale(new_sale(&item, 2)).await?;

        ctx.sale_primary.fail_writes(true);

        let result = ctx
            .sales
            .update_sale(sale.uuid, SaleUpdate { quantity: 6 })
            .await;

        assert!(
            matches!(result, Err(SalesServiceError::Store(_))),
            "expected Store, got {result:?}"
        );
        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 8);

        Ok(())
    }

    #[tokio::test]
    async fn stock_equals_initial_minus_live_sales() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(20)).await?;

        let first = ctx.sales.create_sale(new_sale(&item, 3)).await?;
        let second = ctx.sales.create_sale(new_sale(&item, 4)).await?;
        let third = ctx.sales.create_sale(new_sale(&item, 5)).await?;

        ctx.sales
            .update_sale(second.uuid, SaleUpdate { quantity: 1 })
            .await?;
        ctx.sales.delete_sale(first.uuid).await?;

        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 20 - 1 - 5);

        ctx.sales.delete_sale(second.uuid).await?;
        ctx.sales.delete_sale(third.uuid).await?;

        assert_eq!(ctx.items.get_item(item.uuid).await?.stock, 20);

        Ok(())
    }

    #[tokio::test]
    async fn customer_without_sales_gets_an_empty_list() -> TestResult {
        let ctx = TestContext::new();

        let sales = ctx.sales.get_customer_sales(CUSTOMER).await?;

        assert!(sales.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn customer_summary_totals_every_sale() -> TestResult {
        let ctx = TestContext::new();
        let item = ctx.items.create_item(lamp(10)).await?;

        ctx.sales.create_sale(new_sale(&item, 1)).await?;
        ctx.sales.create_sale(new_sale(&item, 3)).await?;
        ctx.sales
            .create_sale(NewSale {
                customer_id: CustomerId::new(99),
                ..new_sale(&item, 2)
            })
            .await?;

        let summary = ctx.sales.customer_summary(CUSTOMER).await?;

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_spent, item.price * 4);

        Ok(())
    }
}
