//! Item Store Adapters

mod local;
mod postgres;
mod redis;

pub use self::{local::LocalItemStore, postgres::PgItemStore, redis::RedisItemStore};
