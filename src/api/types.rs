//! API request and response types

use crate::conversation::{Message, ToolResult};
use serde::{Deserialize, Serialize};

/// Request to post a user message
#[derive(Debug, Deserialize)]
pub struct UserMessageRequest {
    pub content: String,
}

/// Response for conversation creation
#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub conversation_id: String,
}

/// Response with the conversation history
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

/// Response for a posted message: the assistant's reply plus the structured
/// outcome of any order operation it performed
#[derive(Debug, Serialize)]
pub struct AssistantMessageResponse {
    pub assistant: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
