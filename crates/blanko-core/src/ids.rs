//! Identifier newtypes shared across the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one chat/user context tracked independently by the engine.
///
/// Sessions, input ordering, and artifact naming are all keyed by this id;
/// nothing is ever shared across two different conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a single message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addresses one message for edit/delete operations on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub conversation: ConversationId,
    pub message: MessageId,
}

impl MessageRef {
    pub fn new(conversation: ConversationId, message: MessageId) -> Self {
        Self {
            conversation,
            message,
        }
    }
}
