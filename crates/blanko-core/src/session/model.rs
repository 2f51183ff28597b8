//! Session domain model.
//!
//! A session tracks one conversation's progress through a document's field
//! chain. It exists only between the fill button press and artifact
//! delivery; nothing about it is persisted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::mode::SessionMode;
use crate::catalog::FINAL_STATE;
use crate::error::{BlankoError, Result};
use crate::ids::ConversationId;

/// Per-conversation fill state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Conversation this session belongs to; never shared.
    pub conversation: ConversationId,
    /// Category the document was picked from (for the return trip to the
    /// document page after delivery).
    pub category: String,
    /// Document being filled.
    pub document: String,
    /// Snapshot of the document's field chain, terminal sentinel included.
    pub chain: Vec<String>,
    /// Index of the field awaiting input.
    pub cursor: usize,
    /// Collected field values, keyed by field name.
    pub values: HashMap<String, String>,
    /// Current dialogue mode; recomputed whenever the cursor moves.
    pub mode: SessionMode,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    last_activity: Instant,
}

impl Session {
    pub fn new(
        conversation: ConversationId,
        category: impl Into<String>,
        document: impl Into<String>,
        chain: Vec<String>,
    ) -> Self {
        let mut session = Self {
            conversation,
            category: category.into(),
            document: document.into(),
            chain,
            cursor: 0,
            values: HashMap::new(),
            mode: SessionMode::Collecting,
            created_at: chrono::Utc::now().to_rfc3339(),
            last_activity: Instant::now(),
        };
        session.mode = session.mode_at_cursor();
        session
    }

    /// The field awaiting input, or the terminal sentinel when collection is
    /// complete.
    pub fn current_field(&self) -> &str {
        self.chain
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or(FINAL_STATE)
    }

    /// True once the cursor has reached the terminal sentinel.
    pub fn is_complete(&self) -> bool {
        self.current_field() == FINAL_STATE
    }

    /// Stores `value` under the field at the cursor and advances.
    ///
    /// Returns the mode after the advance. Fails once the chain is complete;
    /// the finalize branch consumes the terminal input instead of recording
    /// it.
    pub fn record_field(&mut self, value: impl Into<String>) -> Result<SessionMode> {
        if self.is_complete() {
            return Err(BlankoError::internal(format!(
                "field chain for '{}' is already complete",
                self.document
            )));
        }
        let field = self.chain[self.cursor].clone();
        self.values.insert(field, value.into());
        self.cursor += 1;
        self.mode = self.mode_at_cursor();
        self.last_activity = Instant::now();
        Ok(self.mode)
    }

    /// Marks the session as just used, deferring idle expiry.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// How long this session has been idle.
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn mode_at_cursor(&self) -> SessionMode {
        if self.is_complete() {
            SessionMode::AwaitingFilename
        } else {
            SessionMode::Collecting
        }
    }
}
