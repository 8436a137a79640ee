//! Items

pub mod errors;
pub mod models;
pub mod publisher;
pub mod repositories;
pub mod service;
pub mod stock;
pub mod store;

pub use errors::ItemsServiceError;
pub use service::*;
