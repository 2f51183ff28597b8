//! In-memory session store.
//!
//! One mutable session per conversation, nothing persisted: a process
//! restart loses in-flight fills, which matches the durability contract.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use super::mode::SessionMode;
use super::model::Session;
use crate::error::{BlankoError, Result};
use crate::ids::ConversationId;

/// Per-conversation session registry.
///
/// All operations are keyed by conversation id; sessions for different
/// conversations never observe each other. Cheap to clone (shared map).
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<ConversationId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `conversation`.
    ///
    /// Fails with [`BlankoError::SessionAlreadyActive`] when a fill is
    /// already in progress; the existing session is left untouched.
    pub async fn begin(
        &self,
        conversation: ConversationId,
        category: impl Into<String>,
        document: impl Into<String>,
        chain: Vec<String>,
    ) -> Result<SessionMode> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&conversation) {
            return Err(BlankoError::SessionAlreadyActive { conversation });
        }
        let session = Session::new(conversation, category, document, chain);
        let mode = session.mode;
        sessions.insert(conversation, session);
        Ok(mode)
    }

    /// The conversation's dialogue mode; `Default` when no session exists.
    pub async fn mode(&self, conversation: ConversationId) -> SessionMode {
        let sessions = self.sessions.read().await;
        sessions
            .get(&conversation)
            .map(|s| s.mode)
            .unwrap_or(SessionMode::Default)
    }

    /// The field awaiting input, or `None` when no session exists.
    pub async fn current_field(&self, conversation: ConversationId) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&conversation)
            .map(|s| s.current_field().to_string())
    }

    /// Records one field value and advances the cursor.
    pub async fn record_field(
        &self,
        conversation: ConversationId,
        value: &str,
    ) -> Result<SessionMode> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&conversation).ok_or_else(|| {
            BlankoError::internal(format!("no active session for conversation {conversation}"))
        })?;
        session.record_field(value)
    }

    /// A copy of the conversation's session, for the finalize step.
    pub async fn snapshot(&self, conversation: ConversationId) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(&conversation).cloned()
    }

    /// Marks the conversation's session as just used.
    pub async fn touch(&self, conversation: ConversationId) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&conversation) {
            session.touch();
        }
    }

    /// Discards the conversation's session, returning it to `Default` mode.
    /// Idempotent.
    pub async fn clear(&self, conversation: ConversationId) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(&conversation).is_some() {
            debug!(%conversation, "session cleared");
        }
    }

    /// Clears every session idle for at least `max_idle` and returns the
    /// affected conversations.
    pub async fn expire_idle(&self, max_idle: Duration) -> Vec<ConversationId> {
        let mut sessions = self.sessions.write().await;
        let expired: Vec<ConversationId> = sessions
            .iter()
            .filter(|(_, s)| s.idle_for() >= max_idle)
            .map(|(id, _)| *id)
            .collect();
        for conversation in &expired {
            sessions.remove(conversation);
        }
        expired
    }

    /// Number of active sessions, for diagnostics.
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
