//! Console transport: a local stand-in for the chat frontend.
//!
//! Menu pages print as numbered button lists, pressing a button is typing
//! its number, and delivered documents are copied into a downloads
//! directory. The engine cannot tell it apart from a network transport.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use colored::Colorize;

use blanko_core::error::{BlankoError, Result};
use blanko_core::ids::{ConversationId, MessageId, MessageRef};
use blanko_core::transport::{
    AssetRef, Button, ChatTransport, Delivery, Incoming, MenuPage, PageAttachment,
};

pub struct ConsoleTransport {
    downloads_dir: PathBuf,
    state: Mutex<ConsoleState>,
}

struct ConsoleState {
    next_message: i64,
    /// The most recently shown keyboard; typed numbers press its buttons.
    keyboard: Option<(MessageRef, Vec<Button>)>,
}

impl ConsoleTransport {
    pub fn new(downloads_dir: PathBuf) -> Self {
        Self {
            downloads_dir,
            state: Mutex::new(ConsoleState {
                next_message: 1,
                keyboard: None,
            }),
        }
    }

    /// Builds the incoming event for a typed line of text.
    pub fn incoming_message(&self, conversation: ConversationId, text: &str) -> Incoming {
        Incoming::Message {
            message: self.allocate(conversation),
            text: text.to_string(),
        }
    }

    /// Builds the button press for a typed number (1-based, over the last
    /// shown keyboard).
    pub fn press(&self, index: usize) -> Option<Incoming> {
        let state = self.state.lock().unwrap();
        let (message, buttons) = state.keyboard.as_ref()?;
        let button = buttons.get(index.checked_sub(1)?)?;
        Some(Incoming::CallbackPress {
            message: *message,
            payload: button.payload.clone(),
        })
    }

    fn allocate(&self, conversation: ConversationId) -> MessageRef {
        let mut state = self.state.lock().unwrap();
        let message = MessageRef::new(conversation, MessageId(state.next_message));
        state.next_message += 1;
        message
    }

    fn show_page(&self, conversation: ConversationId, page: &MenuPage, edited: bool) -> Delivery {
        let (marker, handle) = describe_attachment(&page.attachment);
        if edited {
            println!("{}", "(page updated)".bright_black());
        }
        println!("{}", marker.bright_black());
        println!("{}", page.caption.bright_blue());

        let message = self.allocate(conversation);
        let buttons: Vec<Button> = page.keyboard.iter().flatten().cloned().collect();
        for row in &page.keyboard {
            let mut line = String::new();
            for button in row {
                let number = buttons
                    .iter()
                    .position(|b| b.payload == button.payload)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                line.push_str(&format!("({number}) {}   ", button.label));
            }
            println!("  {}", line.trim_end().cyan());
        }

        let mut state = self.state.lock().unwrap();
        state.keyboard = if buttons.is_empty() {
            None
        } else {
            Some((message, buttons))
        };
        Delivery {
            message,
            attachment_handle: handle,
        }
    }
}

fn describe_attachment(attachment: &PageAttachment) -> (String, Option<String>) {
    match attachment {
        PageAttachment::Photo(AssetRef::File(path)) => (
            format!("[photo {}]", path.display()),
            Some(console_handle(path)),
        ),
        PageAttachment::Photo(AssetRef::Cached(handle)) => {
            (format!("[photo {handle}]"), None)
        }
        PageAttachment::Document(AssetRef::File(path)) => (
            format!("[document {}]", path.display()),
            Some(console_handle(path)),
        ),
        PageAttachment::Document(AssetRef::Cached(handle)) => {
            (format!("[document {handle}]"), None)
        }
    }
}

fn console_handle(path: &Path) -> String {
    format!("console:{}", path.display())
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_menu_page(
        &self,
        conversation: ConversationId,
        page: &MenuPage,
    ) -> Result<Delivery> {
        Ok(self.show_page(conversation, page, false))
    }

    async fn edit_menu_page(&self, message: &MessageRef, page: &MenuPage) -> Result<Delivery> {
        Ok(self.show_page(message.conversation, page, true))
    }

    async fn send_document(
        &self,
        conversation: ConversationId,
        file: &Path,
        filename: &str,
        caption: &str,
    ) -> Result<Delivery> {
        std::fs::create_dir_all(&self.downloads_dir)
            .map_err(|err| BlankoError::transport(format!("downloads dir: {err}")))?;
        let target = self.downloads_dir.join(filename);
        std::fs::copy(file, &target)
            .map_err(|err| BlankoError::transport(format!("saving document: {err}")))?;

        println!("{}", caption.bright_blue());
        println!(
            "{}",
            format!("[document saved to {}]", target.display()).bright_green()
        );
        Ok(Delivery {
            message: self.allocate(conversation),
            attachment_handle: None,
        })
    }

    async fn remove_keyboard(&self, message: &MessageRef) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some((shown, _)) = &state.keyboard {
            if shown == message {
                state.keyboard = None;
            }
        }
        println!("{}", "(keyboard removed)".bright_black());
        Ok(())
    }

    async fn delete_message(&self, _message: &MessageRef) -> Result<()> {
        println!("{}", "(message deleted)".bright_black());
        Ok(())
    }

    async fn send_text(&self, _conversation: ConversationId, text: &str) -> Result<()> {
        println!("{}", text.bright_blue());
        Ok(())
    }
}
