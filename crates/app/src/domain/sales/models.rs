//! Sale Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{customers::CustomerId, domain::items::models::ItemUuid, uuids::TypedUuid};

/// Sale UUID
pub type SaleUuid = TypedUuid<Sale>;

/// Sale Model
///
/// `total_price` is the item price at sale time times `quantity`. It only
/// changes on an explicit update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub uuid: SaleUuid,
    pub item: ItemUuid,
    pub customer_id: CustomerId,
    pub quantity: u32,
    pub total_price: u64,
    pub sold_at: Timestamp,
}

/// New Sale Model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSale {
    pub item: ItemUuid,
    pub customer_id: CustomerId,
    pub quantity: u32,
}

/// Sale Update Model
///
/// Only the quantity changes. A sale's item and customer are fixed once it
/// is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleUpdate {
    pub quantity: u32,
}

/// A customer's purchase history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub sales: Vec<Sale>,
    pub count: usize,
    pub total_spent: u64,
}

impl CustomerSummary {
    #[must_use]
    pub fn new(customer_id: CustomerId, sales: Vec<Sale>) -> Self {
        let total_spent = sales
            .iter()
            .fold(0_u64, |sum, sale| sum.saturating_add(sale.total_price));

        Self {
            customer_id,
            count: sales.len(),
            sales,
            total_spent,
        }
    }
}
