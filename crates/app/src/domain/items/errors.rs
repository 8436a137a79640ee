//! Items service errors.

use thiserror::Error;

use crate::{
    domain::items::{models::ItemUuid, publisher::PublishError},
    errors::ErrorKind,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum ItemsServiceError {
    #[error("invalid item: {0}")]
    Validation(&'static str),

    #[error("item {0} not found")]
    NotFound(ItemUuid),

    #[error("item already exists")]
    AlreadyExists,

    #[error("item store error")]
    Store(#[source] StoreError),

    #[error("failed to publish item change")]
    Publish(#[from] PublishError),
}

impl ItemsServiceError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists => ErrorKind::Conflict,
            Self::Store(_) | Self::Publish(_) => ErrorKind::Io,
        }
    }

    /// Attach the item a store error refers to.
    pub(crate) fn from_store(item: ItemUuid, error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound(item),
            StoreError::Conflict => Self::AlreadyExists,
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_names_the_item() {
        let uuid = ItemUuid::new();
        let error = ItemsServiceError::from_store(uuid, StoreError::NotFound);

        assert!(
            matches!(error, ItemsServiceError::NotFound(missing) if missing == uuid),
            "expected NotFound, got {error:?}"
        );
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unsupported_store_calls_are_io() {
        let error = ItemsServiceError::from_store(ItemUuid::new(), StoreError::Unsupported("redis"));

        assert_eq!(error.kind(), ErrorKind::Io);
    }
}
