//! Auth errors.

use thiserror::Error;

use crate::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is required")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("invalid admin token or insufficient permissions")]
    NotAdmin,

    #[error("users api returned {0}")]
    UnexpectedStatus(u16),

    #[error("failed to reach users api")]
    Http(#[from] reqwest::Error),
}

impl AuthError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::NotAdmin => ErrorKind::Validation,
            Self::UnexpectedStatus(_) | Self::Http(_) => ErrorKind::Io,
        }
    }
}
