use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::ChatError, message::Role};

/// Final reply handed to the persistence layer once streaming has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMessage {
    /// Chat the reply belongs to, when the request named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Message that was edited to produce the reply, for regenerations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub role: Role,
    pub content: String,
}

/// Durable storage for finished replies.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn save(&self, message: SavedMessage) -> Result<(), ChatError>;
}
