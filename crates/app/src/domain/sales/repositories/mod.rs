//! Sale Store Adapters

mod local;
mod postgres;

pub use self::{local::LocalSaleStore, postgres::PgSaleStore};
