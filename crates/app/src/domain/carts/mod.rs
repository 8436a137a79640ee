//! Carts

pub mod errors;
pub mod models;
pub mod repositories;
pub mod service;
pub mod store;

pub use errors::CartsServiceError;
pub use service::*;
