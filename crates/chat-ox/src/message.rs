use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A chat message as rendered by the message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub chat_id: String,
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Empty assistant message with freshly generated ids, used while no
    /// reply is streaming.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: String::new(),
            chat_id: Uuid::new_v4().to_string(),
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_empty_and_distinct() {
        let a = ChatMessage::placeholder();
        let b = ChatMessage::placeholder();

        assert_eq!(a.role, Role::Assistant);
        assert!(a.content.is_empty());
        assert_ne!(a.id, b.id);
        assert_ne!(a.chat_id, b.chat_id);
    }

    #[test]
    fn serializes_camel_case() {
        let message = ChatMessage::placeholder();
        let value = serde_json::to_value(&message).expect("message serializes");

        assert_eq!(value["role"], "assistant");
        assert!(value.get("chatId").is_some());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::User.as_ref(), "user");
    }
}
