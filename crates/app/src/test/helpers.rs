//! Test Helpers

use crate::domain::items::models::{ItemDetails, ItemUuid, NewItem};

/// A valid new item priced at 25.00 with the given stock.
pub(crate) fn lamp(stock: u32) -> NewItem {
    NewItem {
        uuid: ItemUuid::new(),
        details: ItemDetails {
            name: "Desk Lamp".to_string(),
            category: "Lighting".to_string(),
            description: "Adjustable arm, warm white".to_string(),
            price: 25_00,
            stock,
            image_url: Some("https://cdn.example.test/lamp.png".to_string()),
        },
    }
}
