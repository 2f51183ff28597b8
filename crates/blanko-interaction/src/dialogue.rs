//! The fill dialogue state machine.
//!
//! Owns a conversation from the fill button press until artifact delivery:
//! one transition per user message, cursor advancing through the document's
//! field chain, with the terminal input interpreted as the desired output
//! filename.

use std::sync::Arc;

use tracing::{debug, error};

use blanko_core::catalog::{FieldChainRegistry, FINAL_STATE};
use blanko_core::error::{BlankoError, Result};
use blanko_core::ids::{ConversationId, MessageRef};
use blanko_core::lexicon::{keys, Lexicon};
use blanko_core::render::TemplateRenderer;
use blanko_core::session::{SessionMode, SessionStore};
use blanko_core::token::{FillToken, MenuToken};
use blanko_core::transport::ChatTransport;

use crate::navigation::{NavigationController, PageTarget};

pub struct DialogueMachine {
    store: SessionStore,
    chains: Arc<FieldChainRegistry>,
    lexicon: Arc<Lexicon>,
    transport: Arc<dyn ChatTransport>,
    renderer: Arc<dyn TemplateRenderer>,
    navigation: Arc<NavigationController>,
}

impl DialogueMachine {
    pub fn new(
        store: SessionStore,
        chains: Arc<FieldChainRegistry>,
        lexicon: Arc<Lexicon>,
        transport: Arc<dyn ChatTransport>,
        renderer: Arc<dyn TemplateRenderer>,
        navigation: Arc<NavigationController>,
    ) -> Self {
        Self {
            store,
            chains,
            lexicon,
            transport,
            renderer,
            navigation,
        }
    }

    /// Enters the fill dialogue for the document a fill button points at.
    ///
    /// Only honored while the conversation has no active session; a
    /// duplicate press is logged and stays inert, never touching the
    /// session already in progress.
    pub async fn begin_fill(&self, message: &MessageRef, token: &FillToken) -> Result<()> {
        let conversation = message.conversation;
        let chain = self.chains.chain_for(&token.document)?.to_vec();

        match self
            .store
            .begin(conversation, token.category.as_str(), token.document.as_str(), chain)
            .await
        {
            Ok(_) => {}
            Err(err) if err.is_session_already_active() => {
                debug!(%conversation, "fill pressed while a fill is in progress, ignoring");
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        debug!(%conversation, document = %token.document, "fill dialogue started");
        self.transport.remove_keyboard(message).await?;

        let field = self
            .store
            .current_field(conversation)
            .await
            .unwrap_or_else(|| FINAL_STATE.to_string());
        self.prompt_for(conversation, &field).await
    }

    /// Routes a plain text message by the conversation's dialogue mode.
    ///
    /// In `Default` mode the message is noise and gets deleted; nothing is
    /// ever forwarded to the collection logic.
    pub async fn handle_message(&self, message: &MessageRef, text: &str) -> Result<()> {
        match self.store.mode(message.conversation).await {
            SessionMode::Default => self.discard_spam(message).await,
            SessionMode::Collecting => self.collect(message.conversation, text).await,
            SessionMode::AwaitingFilename => self.finalize(message.conversation, text).await,
        }
    }

    async fn discard_spam(&self, message: &MessageRef) -> Result<()> {
        debug!(conversation = %message.conversation, "deleting unrelated message");
        self.transport.delete_message(message).await
    }

    async fn collect(&self, conversation: ConversationId, text: &str) -> Result<()> {
        self.store.record_field(conversation, text).await?;
        // The terminal sentinel's lexicon entry asks for the filename, so
        // the prompt shape is the same for every step.
        let next = self
            .store
            .current_field(conversation)
            .await
            .unwrap_or_else(|| FINAL_STATE.to_string());
        self.prompt_for(conversation, &next).await
    }

    async fn finalize(&self, conversation: ConversationId, filename: &str) -> Result<()> {
        let session = self.store.snapshot(conversation).await.ok_or_else(|| {
            BlankoError::internal(format!(
                "finalize without an active session for conversation {conversation}"
            ))
        })?;

        self.navigation.send_wait_photo(conversation).await?;

        let artifact = match self
            .renderer
            .render(&session.document, conversation, &session.values)
            .await
        {
            Ok(artifact) => artifact,
            Err(err) if err.is_render_failure() => {
                // Collected data stays in place; the user can retry the
                // filename prompt.
                error!(%conversation, document = %session.document, %err, "artifact rendering failed");
                self.store.touch(conversation).await;
                let apology = self.lexicon.text(keys::RENDER_FAILED)?;
                return self.transport.send_text(conversation, apology).await;
            }
            Err(err) => return Err(err),
        };

        let delivery_name = format!("{filename}.{}", artifact.extension());
        let caption = self.lexicon.text(keys::FILLED_FILE)?;
        self.transport
            .send_document(conversation, artifact.path(), &delivery_name, caption)
            .await?;

        // Return the user to the page of the document they just filled,
        // then release the fill slot.
        self.navigation
            .render(
                &MenuToken::document(session.category.as_str(), session.document.as_str()),
                PageTarget::Send(conversation),
            )
            .await?;
        self.store.clear(conversation).await;
        debug!(%conversation, document = %session.document, "fill dialogue finished");
        Ok(())
    }

    async fn prompt_for(&self, conversation: ConversationId, field: &str) -> Result<()> {
        let prefix = self.lexicon.text(keys::PROMPT_ENTER)?;
        let label = self.lexicon.text(field)?;
        self.transport
            .send_text(conversation, &format!("{prefix} {label}"))
            .await
    }
}
