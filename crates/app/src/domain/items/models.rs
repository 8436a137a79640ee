//! Item Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Item UUID
pub type ItemUuid = TypedUuid<Item>;

/// Catalog item together with its authoritative stock counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub uuid: ItemUuid,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Minor currency units.
    pub price: u64,
    pub stock: u32,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Item Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub uuid: ItemUuid,
    pub details: ItemDetails,
}

/// Item Update Model
///
/// Replaces every admin-editable field, stock included.
pub type ItemUpdate = ItemDetails;

/// Admin-editable item fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: u64,
    pub stock: u32,
    pub image_url: Option<String>,
}

impl ItemDetails {
    /// Reject blank descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns the name of the first blank field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }

        if self.category.trim().is_empty() {
            return Err("category is required");
        }

        if self.description.trim().is_empty() {
            return Err("description is required");
        }

        Ok(())
    }

    pub(crate) fn into_item(self, uuid: ItemUuid, created_at: Timestamp, updated_at: Timestamp) -> Item {
        Item {
            uuid,
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image_url: self.image_url,
            created_at,
            updated_at,
        }
    }
}
