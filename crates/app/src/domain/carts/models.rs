//! Cart Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{customers::CustomerId, domain::items::models::ItemUuid, uuids::TypedUuid};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Model
///
/// At most one per customer. `total` is informational: it was computed from
/// the prices current at the last write and is never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub uuid: CartUuid,
    pub customer_id: CustomerId,
    pub items: Vec<CartLine>,
    pub total: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    /// A cart with no lines, not yet persisted.
    #[must_use]
    pub fn empty(customer_id: CustomerId) -> Self {
        let now = Timestamp::now();

        Self {
            uuid: CartUuid::new(),
            customer_id,
            items: Vec::new(),
            total: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn line(&self, item: ItemUuid) -> Option<&CartLine> {
        self.items.iter().find(|line| line.item == item)
    }

    pub fn line_mut(&mut self, item: ItemUuid) -> Option<&mut CartLine> {
        self.items.iter_mut().find(|line| line.item == item)
    }

    /// Drop the line for `item`, returning whether one existed.
    pub fn remove_line(&mut self, item: ItemUuid) -> bool {
        let before = self.items.len();

        self.items.retain(|line| line.item != item);

        self.items.len() != before
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart line. `quantity` is at least one while the line exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: ItemUuid,
    pub quantity: u32,
}

/// Cart joined with the current catalog at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartResponse {
    /// `None` until the customer's first write.
    pub uuid: Option<CartUuid>,
    pub customer_id: CustomerId,
    pub items: Vec<CartLineDetails>,
    pub item_count: u64,
    pub total: u64,
    pub updated_at: Option<Timestamp>,
}

impl CartResponse {
    /// Build the read model from already-resolved lines.
    #[must_use]
    pub fn new(customer_id: CustomerId, cart: Option<&Cart>, items: Vec<CartLineDetails>) -> Self {
        let total = total_of(&items);

        let item_count = items
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum();

        Self {
            uuid: cart.map(|cart| cart.uuid),
            customer_id,
            items,
            item_count,
            total,
            updated_at: cart.map(|cart| cart.updated_at),
        }
    }
}

/// Sum of line subtotals.
#[must_use]
pub fn total_of(lines: &[CartLineDetails]) -> u64 {
    lines
        .iter()
        .fold(0_u64, |sum, line| sum.saturating_add(line.subtotal))
}

/// A cart line with the item's current catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineDetails {
    pub item: ItemUuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub price: u64,
    pub stock: u32,
    pub quantity: u32,
    pub subtotal: u64,
}
