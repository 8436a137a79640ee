//! Sales service errors.

use thiserror::Error;

use crate::{
    domain::{
        items::{
            ItemsServiceError,
            stock::{Shortfall, StockError},
        },
        sales::models::SaleUuid,
    },
    errors::ErrorKind,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum SalesServiceError {
    #[error("invalid sale: {0}")]
    Validation(&'static str),

    #[error("sale {0} not found")]
    NotFound(SaleUuid),

    #[error(transparent)]
    InsufficientStock(#[from] Shortfall),

    #[error("item lookup or stock movement failed")]
    Item(#[from] ItemsServiceError),

    #[error("sale store error")]
    Store(#[source] StoreError),
}

impl SalesServiceError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InsufficientStock(_) => ErrorKind::InsufficientStock,
            Self::Item(error) => error.kind(),
            Self::Store(error) => error.kind(),
        }
    }

    pub(crate) fn from_store(sale: SaleUuid, error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound(sale),
            other => Self::Store(other),
        }
    }
}

impl From<StockError> for SalesServiceError {
    fn from(error: StockError) -> Self {
        match error {
            StockError::Shortfall(shortfall) => Self::InsufficientStock(shortfall),
            StockError::Items(error) => Self::Item(error),
        }
    }
}
