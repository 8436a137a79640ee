//! Token verification contract.

use async_trait::async_trait;
use mockall::automock;

use crate::auth::AuthError;

#[automock]
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Accept any live customer or admin token.
    async fn verify_token(&self, token: &str) -> Result<(), AuthError>;

    /// Accept only admin tokens.
    async fn verify_admin_token(&self, token: &str) -> Result<(), AuthError>;
}
