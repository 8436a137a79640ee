//! Users API verifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use tracing::debug;

use crate::auth::{AuthError, AuthVerifier};

/// Configuration for reaching the users API.
#[derive(Debug, Clone)]
pub struct UsersApiConfig {
    /// Base URL, e.g. `"http://users-api:8080"`.
    pub url: String,

    /// Upper bound for one verification round trip.
    pub timeout: Duration,
}

/// Forwards tokens to the users API's verification endpoints.
#[derive(Debug, Clone)]
pub struct UsersApiAuthVerifier {
    base_url: String,
    http: Client,
}

impl UsersApiAuthVerifier {
    /// Build a verifier whose every request is bounded by `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be initialised.
    pub fn new(config: UsersApiConfig) -> Result<Self, AuthError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/{path}", self.base_url)
    }

    async fn verify(&self, path: &str, token: &str, rejected: AuthError) -> Result<(), AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let response = self
            .http
            .post(self.endpoint(path))
            .header(AUTHORIZATION, token)
            .send()
            .await?;

        let status = response.status();

        debug!(endpoint = path, %status, "token verification answered");

        match status {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(rejected),
            other => Err(AuthError::UnexpectedStatus(other.as_u16())),
        }
    }
}

#[async_trait]
impl AuthVerifier for UsersApiAuthVerifier {
    async fn verify_token(&self, token: &str) -> Result<(), AuthError> {
        self.verify("verify-token", token, AuthError::InvalidToken)
            .await
    }

    async fn verify_admin_token(&self, token: &str) -> Result<(), AuthError> {
        self.verify("verify-admin-token", token, AuthError::NotAdmin)
            .await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn verifier() -> Result<UsersApiAuthVerifier, AuthError> {
        UsersApiAuthVerifier::new(UsersApiConfig {
            url: "http://127.0.0.1:9/".to_string(),
            timeout: Duration::from_millis(200),
        })
    }

    #[test]
    fn endpoints_ignore_trailing_slash() -> TestResult {
        assert_eq!(
            verifier()?.endpoint("verify-token"),
            "http://127.0.0.1:9/auth/verify-token"
        );

        Ok(())
    }

    #[tokio::test]
    async fn blank_tokens_are_rejected_without_a_request() -> TestResult {
        let verifier = verifier()?;

        let result = verifier.verify_admin_token("   ").await;

        assert!(
            matches!(result, Err(AuthError::MissingToken)),
            "expected MissingToken, got {result:?}"
        );

        Ok(())
    }
}
