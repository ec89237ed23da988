use bon::Builder;
use serde::{Deserialize, Serialize};

/// Body of the edit/regenerate call: replace a user message and stream a new reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageRequest {
    #[builder(into)]
    pub content: String,
    #[builder(into)]
    pub message_id: String,
}

/// Body of the new-message call: append a user message to a chat and stream the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[builder(into)]
    pub content: String,
    #[builder(into)]
    pub chat_id: String,
}
