//! Item change notifications for the search indexer.

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use mockall::automock;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::items::models::ItemUuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl Display for ChangeAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Wire shape of a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEvent {
    pub action: ChangeAction,
    pub item_id: ItemUuid,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode item event")]
    Encode(#[from] serde_json::Error),

    #[error("failed to reach message bus")]
    Transport(#[from] redis::RedisError),
}

#[automock]
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    async fn publish(&self, action: ChangeAction, item: ItemUuid) -> Result<(), PublishError>;
}

/// Publishes item events on a Redis pub/sub channel.
#[derive(Clone)]
pub struct RedisChangePublisher {
    connection: ConnectionManager,
    channel: String,
}

impl RedisChangePublisher {
    #[must_use]
    pub fn new(connection: ConnectionManager, channel: impl Into<String>) -> Self {
        Self {
            connection,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl ChangePublisher for RedisChangePublisher {
    async fn publish(&self, action: ChangeAction, item: ItemUuid) -> Result<(), PublishError> {
        let payload = serde_json::to_string(&ItemEvent {
            action,
            item_id: item,
        })?;

        let mut connection = self.connection.clone();
        let receivers: i64 = connection.publish(&self.channel, payload).await?;

        debug!(channel = %self.channel, %action, %item, receivers, "item event published");

        Ok(())
    }
}
