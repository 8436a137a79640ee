//! Checkout service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{error, info, warn};

use crate::{
    customers::CustomerId,
    domain::{
        carts::CartsService,
        checkout::{
            errors::CheckoutError,
            saga::{LineState, Saga},
        },
        items::{ItemsService, stock::ensure_available},
        sales::{
            SalesService,
            models::{NewSale, Sale},
        },
    },
};

/// Turns a cart into sales, one compensable step per line.
///
/// Pre-validation is advisory. Each sale creation does its own conditional
/// stock decrement, so a concurrent buyer can still fail a later line, and
/// the committed lines are then deleted again newest first.
pub struct CheckoutOrchestrator {
    carts: Arc<dyn CartsService>,
    items: Arc<dyn ItemsService>,
    sales: Arc<dyn SalesService>,
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsService>,
        items: Arc<dyn ItemsService>,
        sales: Arc<dyn SalesService>,
    ) -> Self {
        Self {
            carts,
            items,
            sales,
        }
    }

    async fn compensate(&self, customer: CustomerId, saga: &mut Saga) {
        for (index, sale) in saga.to_compensate() {
            match self.sales.delete_sale(sale.uuid).await {
                Ok(()) => saga.compensated(index, true),
                Err(source) => {
                    error!(
                        %customer,
                        sale = %sale.uuid,
                        item = %sale.item,
                        quantity = sale.quantity,
                        error = %source,
                        "checkout compensation failed"
                    );

                    saga.compensated(index, false);
                }
            }
        }

        warn!(
            %customer,
            compensated = saga.count(|state| matches!(state, LineState::Compensated(_))),
            failed = saga.count(|state| matches!(state, LineState::CompensationFailed(_))),
            "checkout rolled back"
        );
    }
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator").finish_non_exhaustive()
    }
}

#[async_trait]
impl CheckoutService for CheckoutOrchestrator {
    async fn checkout(&self, customer: CustomerId) -> Result<Vec<Sale>, CheckoutError> {
        if !customer.is_valid() {
            return Err(CheckoutError::InvalidCustomer);
        }

        let cart = self
            .carts
            .stored_cart(customer)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart { customer })?;

        for line in &cart.items {
            let item = self.items.get_item(line.item).await?;

            ensure_available(&item, line.quantity)?;
        }

        let mut saga = Saga::new(&cart.items);

        for (index, line) in cart.items.iter().enumerate() {
            let created = self
                .sales
                .create_sale(NewSale {
                    item: line.item,
                    customer_id: customer,
                    quantity: line.quantity,
                })
                .await;

            match created {
                Ok(sale) => saga.commit(index, sale),
                Err(source) => {
                    warn!(%customer, item = %line.item, error = %source, "checkout line failed");

                    self.compensate(customer, &mut saga).await;

                    return Err(CheckoutError::Sale(source));
                }
            }
        }

        if let Err(source) = self.carts.clear_cart(customer).await {
            warn!(%customer, error = %source, "cart not cleared after checkout");
        }

        debug_assert!(saga.is_complete(), "every line committed");

        let sales = saga.into_sales();

        info!(%customer, sales = sales.len(), "checkout complete");

        Ok(sales)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Convert the customer's cart into sales and clear it.
    async fn checkout(&self, customer: CustomerId) -> Result<Vec<Sale>, CheckoutError>;
}
