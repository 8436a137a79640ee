//! Carts service errors.

use thiserror::Error;

use crate::{
    customers::CustomerId,
    domain::items::{ItemsServiceError, models::ItemUuid, stock::Shortfall},
    errors::ErrorKind,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("invalid cart request: {0}")]
    Validation(&'static str),

    #[error("customer {customer} already has a cart")]
    AlreadyExists { customer: CustomerId },

    #[error("item {item} is not in the cart of customer {customer}")]
    LineNotFound { customer: CustomerId, item: ItemUuid },

    #[error(transparent)]
    InsufficientStock(#[from] Shortfall),

    #[error("item lookup failed")]
    Item(#[from] ItemsServiceError),

    #[error("cart store error")]
    Store(#[source] StoreError),
}

impl CartsServiceError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::AlreadyExists { .. } => ErrorKind::Conflict,
            Self::LineNotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientStock(_) => ErrorKind::InsufficientStock,
            Self::Item(error) => error.kind(),
            Self::Store(error) => error.kind(),
        }
    }
}

impl From<StoreError> for CartsServiceError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
