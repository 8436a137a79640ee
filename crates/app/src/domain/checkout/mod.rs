//! Checkout

pub mod errors;
pub mod saga;
pub mod service;

pub use errors::CheckoutError;
pub use service::*;
