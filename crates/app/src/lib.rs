//! Storefront fulfilment core.
//!
//! Items with authoritative stock counters, per-customer carts, a sales
//! ledger and a checkout that turns a cart into sales or undoes every sale
//! it made.

pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod customers;
pub mod database;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod store;
pub mod uuids;

#[cfg(test)]
mod test;
