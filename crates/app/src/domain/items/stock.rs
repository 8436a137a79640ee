//! Stock movement shared by carts, sales and checkout.
//!
//! Every stock change goes through [`ItemsService::decrement_stock_atomic`]
//! or [`ItemsService::increment_stock`]. Availability checks made here are
//! advisory: only the conditional decrement is safe under concurrency.

use std::cmp::Ordering;

use thiserror::Error;

use crate::{
    domain::items::{
        errors::ItemsServiceError,
        models::{Item, ItemUuid},
        service::ItemsService,
    },
    errors::ErrorKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient stock for item {item}: requested {requested}, available {available}")]
pub struct Shortfall {
    pub item: ItemUuid,
    pub requested: u32,
    pub available: u32,
}

#[derive(Debug, Error)]
pub enum StockError {
    #[error(transparent)]
    Shortfall(#[from] Shortfall),

    #[error(transparent)]
    Items(#[from] ItemsServiceError),
}

impl StockError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Shortfall(_) => ErrorKind::InsufficientStock,
            Self::Items(error) => error.kind(),
        }
    }
}

/// Check `requested` against the stock `item` was read with.
///
/// # Errors
///
/// Returns a [`Shortfall`] when the item holds less than `requested`.
pub fn ensure_available(item: &Item, requested: u32) -> Result<(), Shortfall> {
    if item.stock < requested {
        return Err(Shortfall {
            item: item.uuid,
            requested,
            available: item.stock,
        });
    }

    Ok(())
}

/// Remove `quantity` units of `item` from stock.
///
/// # Errors
///
/// Returns a [`Shortfall`] carrying the re-read stock when the conditional
/// decrement is refused, or the item service error.
pub async fn take(items: &dyn ItemsService, item: &Item, quantity: u32) -> Result<(), StockError> {
    ensure_available(item, quantity)?;

    if items.decrement_stock_atomic(item.uuid, quantity).await? {
        return Ok(());
    }

    let current = items.get_item(item.uuid).await?;

    Err(Shortfall {
        item: item.uuid,
        requested: quantity,
        available: current.stock,
    }
    .into())
}

/// Return `quantity` units of `item` to stock.
///
/// # Errors
///
/// Returns the item service error; the caller owns the un-restored units.
pub async fn give_back(
    items: &dyn ItemsService,
    item: ItemUuid,
    quantity: u32,
) -> Result<(), ItemsServiceError> {
    items.increment_stock(item, quantity).await
}

/// Move stock so that `from` units held against `item` become `to` units.
///
/// # Errors
///
/// Same as [`take`] when `to > from`, and [`give_back`] otherwise.
pub async fn apply_delta(
    items: &dyn ItemsService,
    item: &Item,
    from: u32,
    to: u32,
) -> Result<(), StockError> {
    match to.cmp(&from) {
        Ordering::Greater => take(items, item, to - from).await,
        Ordering::Less => Ok(give_back(items, item.uuid, from - to).await?),
        Ordering::Equal => Ok(()),
    }
}
