//! Update router.
//!
//! Single entry point for conversation events: commands, button presses,
//! and plain messages fan out to the navigation controller or the dialogue
//! machine. Lookup and codec failures on a navigation action surface to the
//! user as a generic notice; transport failures propagate to the dispatch
//! loop.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use blanko_core::error::Result;
use blanko_core::lexicon::{keys, Lexicon};
use blanko_core::session::SessionStore;
use blanko_core::token::{Callback, MenuToken};
use blanko_core::transport::{ChatTransport, Incoming, UpdateHandler};

use crate::dialogue::DialogueMachine;
use crate::navigation::{NavigationController, PageTarget};

/// The command that greets the user and opens the main menu.
pub const START_COMMAND: &str = "start";

pub struct UpdateRouter {
    navigation: Arc<NavigationController>,
    dialogue: Arc<DialogueMachine>,
    store: SessionStore,
    lexicon: Arc<Lexicon>,
    transport: Arc<dyn ChatTransport>,
}

impl UpdateRouter {
    pub fn new(
        navigation: Arc<NavigationController>,
        dialogue: Arc<DialogueMachine>,
        store: SessionStore,
        lexicon: Arc<Lexicon>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            navigation,
            dialogue,
            store,
            lexicon,
            transport,
        }
    }

    async fn dispatch(&self, incoming: Incoming) -> Result<()> {
        match incoming {
            Incoming::Command { conversation, name } if name == START_COMMAND => {
                if self.store.mode(conversation).await.is_active() {
                    debug!(%conversation, "start command during a fill, ignoring");
                    return Ok(());
                }
                let description = self.lexicon.text(keys::DESCRIPTION)?;
                self.transport.send_text(conversation, description).await?;
                self.navigation
                    .render(&MenuToken::main(), PageTarget::Send(conversation))
                    .await
            }
            Incoming::Command { conversation, name } => {
                debug!(%conversation, command = %name, "unsupported command, ignoring");
                Ok(())
            }
            Incoming::CallbackPress { message, payload } => match Callback::decode(&payload)? {
                Callback::Menu(token) => {
                    self.navigation
                        .render(&token, PageTarget::Edit(message))
                        .await
                }
                Callback::Fill(token) => self.dialogue.begin_fill(&message, &token).await,
            },
            Incoming::Message { message, text } => {
                self.dialogue.handle_message(&message, &text).await
            }
        }
    }
}

#[async_trait]
impl UpdateHandler for UpdateRouter {
    async fn handle(&self, incoming: Incoming) -> Result<()> {
        let conversation = incoming.conversation();
        match self.dispatch(incoming).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_user_recoverable() => {
                warn!(%conversation, %err, "navigation action failed");
                match self.lexicon.text(keys::TRY_AGAIN) {
                    Ok(notice) => {
                        if let Err(send_err) =
                            self.transport.send_text(conversation, notice).await
                        {
                            warn!(%conversation, %send_err, "failed to deliver the try-again notice");
                        }
                    }
                    Err(lex_err) => warn!(%conversation, %lex_err, "try-again notice untranslated"),
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
