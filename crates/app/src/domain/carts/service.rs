//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    cache::TieredCache,
    customers::CustomerId,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{Cart, CartLine, CartLineDetails, CartResponse, total_of},
            store::CartStore,
        },
        items::{ItemsService, models::ItemUuid, stock::ensure_available},
    },
    store::StoreError,
};

/// Owns the one-cart-per-customer document.
pub struct CartManager {
    primary: Arc<dyn CartStore>,
    tiers: TieredCache<CustomerId, Cart>,
    items: Arc<dyn ItemsService>,
}

impl CartManager {
    #[must_use]
    pub fn new(
        primary: Arc<dyn CartStore>,
        tiers: TieredCache<CustomerId, Cart>,
        items: Arc<dyn ItemsService>,
    ) -> Self {
        Self {
            primary,
            tiers,
            items,
        }
    }

    async fn load(&self, customer: CustomerId) -> Result<Option<Cart>, CartsServiceError> {
        let primary = &self.primary;

        let loaded = self
            .tiers
            .read_through(&customer, || async move {
                primary.get_by_customer_id(customer).await
            })
            .await;

        match loaded {
            Ok(cart) => Ok(Some(cart)),
            Err(StoreError::NotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Join each line with the current catalog. Unresolvable lines are dropped.
    async fn resolve_lines(&self, cart: &Cart) -> Vec<CartLineDetails> {
        let mut lines = Vec::with_capacity(cart.items.len());

        for line in &cart.items {
            match self.items.get_item(line.item).await {
                Ok(item) => lines.push(CartLineDetails {
                    item: item.uuid,
                    subtotal: item.price.saturating_mul(u64::from(line.quantity)),
                    name: item.name,
                    description: item.description,
                    image_url: item.image_url,
                    price: item.price,
                    stock: item.stock,
                    quantity: line.quantity,
                }),
                Err(error) => {
                    debug!(
                        customer = %cart.customer_id,
                        item = %line.item,
                        error = %error,
                        "dropping unresolvable cart line"
                    );
                }
            }
        }

        lines
    }

    /// Stamp, price and upsert `cart`, then mirror it into the cache.
    async fn save(&self, mut cart: Cart) -> Result<CartResponse, CartsServiceError> {
        let lines = self.resolve_lines(&cart).await;
        let customer = cart.customer_id;

        cart.total = total_of(&lines);
        cart.updated_at = Timestamp::now();

        let saved = self.primary.upsert(cart).await?;

        self.tiers.write_through(&customer, &saved).await;

        Ok(CartResponse::new(customer, Some(&saved), lines))
    }
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("tiers", &self.tiers)
            .finish_non_exhaustive()
    }
}

fn require_customer(customer: CustomerId) -> Result<(), CartsServiceError> {
    if !customer.is_valid() {
        return Err(CartsServiceError::Validation("customer id is required"));
    }

    Ok(())
}

fn require_line(
    customer: CustomerId,
    item: ItemUuid,
    quantity: u32,
) -> Result<(), CartsServiceError> {
    require_customer(customer)?;

    if item.is_nil() {
        return Err(CartsServiceError::Validation("item id is required"));
    }

    if quantity == 0 {
        return Err(CartsServiceError::Validation("quantity must be positive"));
    }

    Ok(())
}

#[async_trait]
impl CartsService for CartManager {
    async fn get_cart(&self, customer: CustomerId) -> Result<CartResponse, CartsServiceError> {
        require_customer(customer)?;

        let Some(cart) = self.load(customer).await? else {
            return Ok(CartResponse::new(customer, None, Vec::new()));
        };

        let lines = self.resolve_lines(&cart).await;

        Ok(CartResponse::new(customer, Some(&cart), lines))
    }

    async fn stored_cart(&self, customer: CustomerId) -> Result<Option<Cart>, CartsServiceError> {
        require_customer(customer)?;

        self.load(customer).await
    }

    async fn create_cart(&self, customer: CustomerId) -> Result<CartResponse, CartsServiceError> {
        require_customer(customer)?;

        let created = self
            .primary
            .create(Cart::empty(customer))
            .await
            .map_err(|error| match error {
                StoreError::Conflict => CartsServiceError::AlreadyExists { customer },
                other => other.into(),
            })?;

        self.tiers.write_through(&customer, &created).await;

        info!(%customer, cart = %created.uuid, "cart created");

        Ok(CartResponse::new(customer, Some(&created), Vec::new()))
    }

    async fn add_item(
        &self,
        customer: CustomerId,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<CartResponse, CartsServiceError> {
        require_line(customer, item, quantity)?;

        let current = self.items.get_item(item).await?;

        ensure_available(&current, quantity)?;

        let mut cart = self
            .load(customer)
            .await?
            .unwrap_or_else(|| Cart::empty(customer));

        if let Some(line) = cart.line_mut(item) {
            let combined = line
                .quantity
                .checked_add(quantity)
                .ok_or(CartsServiceError::Validation("quantity is too large"))?;

            ensure_available(&current, combined)?;

            line.quantity = combined;
        } else {
            cart.items.push(CartLine { item, quantity });
        }

        debug!(%customer, %item, quantity, "item added to cart");

        self.save(cart).await
    }

    async fn update_item(
        &self,
        customer: CustomerId,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<CartResponse, CartsServiceError> {
        if quantity == 0 {
            return self.remove_item(customer, item).await;
        }

        require_line(customer, item, quantity)?;

        let mut cart = self
            .load(customer)
            .await?
            .filter(|cart| cart.line(item).is_some())
            .ok_or(CartsServiceError::LineNotFound { customer, item })?;

        let current = self.items.get_item(item).await?;

        ensure_available(&current, quantity)?;

        if let Some(line) = cart.line_mut(item) {
            line.quantity = quantity;
        }

        self.save(cart).await
    }

    async fn remove_item(
        &self,
        customer: CustomerId,
        item: ItemUuid,
    ) -> Result<CartResponse, CartsServiceError> {
        require_customer(customer)?;

        let mut cart = self
            .load(customer)
            .await?
            .ok_or(CartsServiceError::LineNotFound { customer, item })?;

        if !cart.remove_line(item) {
            return Err(CartsServiceError::LineNotFound { customer, item });
        }

        self.save(cart).await
    }

    async fn clear_cart(&self, customer: CustomerId) -> Result<(), CartsServiceError> {
        require_customer(customer)?;

        let mut cart = self
            .load(customer)
            .await?
            .unwrap_or_else(|| Cart::empty(customer));

        cart.items.clear();
        cart.total = 0;
        cart.updated_at = Timestamp::now();

        self.primary.upsert(cart).await?;

        self.tiers.evict(&customer).await;

        info!(%customer, "cart cleared");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The customer's cart joined with current catalog data.
    ///
    /// A customer without a cart gets an empty response.
    async fn get_cart(&self, customer: CustomerId) -> Result<CartResponse, CartsServiceError>;

    /// The persisted cart as stored, without enrichment.
    async fn stored_cart(&self, customer: CustomerId) -> Result<Option<Cart>, CartsServiceError>;

    /// Creates an empty cart for a customer who has none.
    async fn create_cart(&self, customer: CustomerId) -> Result<CartResponse, CartsServiceError>;

    /// Add `quantity` of `item`, merging with an existing line.
    async fn add_item(
        &self,
        customer: CustomerId,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<CartResponse, CartsServiceError>;

    /// Replace the quantity of an existing line. Zero removes it.
    async fn update_item(
        &self,
        customer: CustomerId,
        item: ItemUuid,
        quantity: u32,
    ) -> Result<CartResponse, CartsServiceError>;

    async fn remove_item(
        &self,
        customer: CustomerId,
        item: ItemUuid,
    ) -> Result<CartResponse, CartsServiceError>;

    /// Empty the cart, keeping the document.
    async fn clear_cart(&self, customer: CustomerId) -> Result<(), CartsServiceError>;
}
