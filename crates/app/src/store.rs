//! Errors shared by every store adapter.

use std::num::TryFromIntError;

use sqlx::error::{DatabaseError, ErrorKind as SqlErrorKind};
use thiserror::Error;

use crate::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    #[error("operation not supported by the {0} tier")]
    Unsupported(&'static str),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),

    #[error("cache error")]
    Redis(#[from] redis::RedisError),

    #[error("encoding error")]
    Codec(#[from] serde_json::Error),

    #[error("numeric value out of range for {0}")]
    OutOfRange(&'static str, #[source] TryFromIntError),
}

impl StoreError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Conflict => ErrorKind::Conflict,
            Self::Unsupported(_)
            | Self::Sql(_)
            | Self::Redis(_)
            | Self::Codec(_)
            | Self::OutOfRange(..) => ErrorKind::Io,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::UniqueViolation) => Self::Conflict,
            Some(_) | None => Self::Sql(error),
        }
    }
}
