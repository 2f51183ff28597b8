//! Session mode for the fill dialogue.

use serde::{Deserialize, Serialize};

/// Where a conversation currently is in the fill dialogue.
///
/// `Default` means no session exists: menu navigation is allowed and fill
/// tokens are accepted. In `Collecting`, every plain message is consumed as
/// the next field value. `AwaitingFilename` is the terminal collection step:
/// the next message is the desired output filename, not a template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Default,
    Collecting,
    AwaitingFilename,
}

impl SessionMode {
    /// True while a session exists for the conversation.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Default)
    }
}
