//! Authentication
//!
//! Tokens are issued and checked by the users API; this side only forwards
//! them and reads the verdict.

mod errors;
mod users_api;
mod verifier;

pub use errors::*;
pub use users_api::{UsersApiAuthVerifier, UsersApiConfig};
pub use verifier::*;
