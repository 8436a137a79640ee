//! Cart Store Adapters

mod local;
mod postgres;

pub use self::{local::LocalCartStore, postgres::PgCartStore};
