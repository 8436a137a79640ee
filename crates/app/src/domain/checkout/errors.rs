//! Checkout errors.

use thiserror::Error;

use crate::{
    customers::CustomerId,
    domain::{
        carts::CartsServiceError,
        items::{ItemsServiceError, stock::Shortfall},
        sales::SalesServiceError,
    },
    errors::ErrorKind,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("customer id is required")]
    InvalidCustomer,

    #[error("cart of customer {customer} is empty")]
    EmptyCart { customer: CustomerId },

    #[error(transparent)]
    InsufficientStock(#[from] Shortfall),

    #[error("item lookup failed")]
    Item(#[from] ItemsServiceError),

    #[error("cart lookup failed")]
    Cart(#[from] CartsServiceError),

    /// The sale creation that stopped the checkout, after compensation.
    #[error("sale creation failed")]
    Sale(#[from] SalesServiceError),
}

impl CheckoutError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCustomer | Self::EmptyCart { .. } => ErrorKind::Validation,
            Self::InsufficientStock(_) => ErrorKind::InsufficientStock,
            Self::Item(error) => error.kind(),
            Self::Cart(error) => error.kind(),
            Self::Sale(error) => error.kind(),
        }
    }
}
