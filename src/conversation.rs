//! Conversation state: messages, tool results, and the in-memory
//! conversation store.
//!
//! Conversations live for the process lifetime only. Messages are
//! append-only and immutable once stored; insertion order is the only
//! ordering guarantee.

use crate::intent::Action;
use crate::orders::OrderStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Why an order operation did not produce a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolError {
    NotFound,
    InvalidTransition,
}

/// Structured outcome of an order lookup or cancellation, attached to the
/// assistant message that reports it.
///
/// `status` is present on success and on `invalid_transition` (where it is
/// the unchanged current status); `error` is present on failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub action: Action,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    pub fn ok(action: Action, order_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            action,
            order_id: order_id.into(),
            status: Some(status),
            error: None,
        }
    }

    pub fn not_found(action: Action, order_id: impl Into<String>) -> Self {
        Self {
            action,
            order_id: order_id.into(),
            status: None,
            error: Some(ToolError::NotFound),
        }
    }

    pub fn invalid_transition(
        action: Action,
        order_id: impl Into<String>,
        status: OrderStatus,
    ) -> Self {
        Self {
            action,
            order_id: order_id.into(),
            status: Some(status),
            error: Some(ToolError::InvalidTransition),
        }
    }
}

/// One entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_result: None,
        }
    }

    pub fn assistant(content: impl Into<String>, tool_result: Option<ToolResult>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_result,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("conversation {0} not found")]
    NotFound(Uuid),
}

/// In-memory conversation table, keyed by UUID. Cheap to clone; all clones
/// share one table. A single store-level lock serializes appends, which
/// keeps per-conversation message order strictly append order.
#[derive(Clone, Default)]
pub struct ConversationStore {
    conversations: Arc<RwLock<HashMap<Uuid, Vec<Message>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty conversation and return its fresh id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.conversations.write().unwrap().insert(id, Vec::new());
        id
    }

    pub fn append(&self, id: Uuid, message: Message) -> Result<(), ConversationError> {
        let mut conversations = self.conversations.write().unwrap();
        let messages = conversations
            .get_mut(&id)
            .ok_or(ConversationError::NotFound(id))?;
        messages.push(message);
        Ok(())
    }

    /// Snapshot of the conversation history in append order.
    pub fn list(&self, id: Uuid) -> Result<Vec<Message>, ConversationError> {
        self.conversations
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(ConversationError::NotFound(id))
    }
}
