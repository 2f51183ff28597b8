//! Chat transport contract.
//!
//! The engine talks to the chat frontend exclusively through
//! [`ChatTransport`]; the network layer (long polling, webhooks, a local
//! console) lives behind it. Send/edit calls hand back the delivered
//! message's handle plus the remote attachment handle so callers can feed
//! the attachment cache.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{ConversationId, MessageRef};

/// A static asset to attach: either a local file that still needs uploading
/// or a remote handle from an earlier upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    File(std::path::PathBuf),
    Cached(String),
}

/// What a menu page attaches above its caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAttachment {
    Photo(AssetRef),
    Document(AssetRef),
}

/// One clickable button: visible label plus the opaque callback payload it
/// reports back when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// A fully assembled menu page: attachment, caption, button rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPage {
    pub attachment: PageAttachment,
    pub caption: String,
    pub keyboard: Vec<Vec<Button>>,
}

/// Result of a send/edit call: where the message landed and, when an upload
/// happened, the remote handle the transport assigned to the attachment.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: MessageRef,
    pub attachment_handle: Option<String>,
}

/// One event arriving from the chat frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A slash command, name without the leading slash.
    Command {
        conversation: ConversationId,
        name: String,
    },
    /// A button press on a previously sent menu page.
    CallbackPress { message: MessageRef, payload: String },
    /// A plain text message.
    Message { message: MessageRef, text: String },
}

impl Incoming {
    /// The conversation this event belongs to.
    pub fn conversation(&self) -> ConversationId {
        match self {
            Self::Command { conversation, .. } => *conversation,
            Self::CallbackPress { message, .. } | Self::Message { message, .. } => {
                message.conversation
            }
        }
    }
}

/// Narrow interface to the chat frontend.
///
/// Every failure is a [`crate::error::BlankoError::TransportFailure`]; the
/// engine never retries, the dispatch loop decides what to do with it.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a fresh menu page.
    async fn send_menu_page(
        &self,
        conversation: ConversationId,
        page: &MenuPage,
    ) -> Result<Delivery>;

    /// Replaces an existing message's media, caption, and keyboard in place.
    async fn edit_menu_page(&self, message: &MessageRef, page: &MenuPage) -> Result<Delivery>;

    /// Sends a file under the given display filename.
    async fn send_document(
        &self,
        conversation: ConversationId,
        file: &Path,
        filename: &str,
        caption: &str,
    ) -> Result<Delivery>;

    /// Strips the button keyboard from a message, leaving its content.
    async fn remove_keyboard(&self, message: &MessageRef) -> Result<()>;

    /// Deletes a message outright.
    async fn delete_message(&self, message: &MessageRef) -> Result<()>;

    /// Sends a plain text message (prompts and notices).
    async fn send_text(&self, conversation: ConversationId, text: &str) -> Result<()>;
}

/// Entry point the dispatcher feeds conversation events into.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, incoming: Incoming) -> Result<()>;
}
