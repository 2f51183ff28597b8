//! Menu navigation controller.
//!
//! Interprets decoded menu tokens and renders the matching page through the
//! chat transport. Button clicks edit the originating message in place; the
//! start command and the post-delivery return trip send fresh pages.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use blanko_core::catalog::MenuTree;
use blanko_core::error::{BlankoError, Result};
use blanko_core::ids::{ConversationId, MessageRef};
use blanko_core::lexicon::{keys, Lexicon};
use blanko_core::token::MenuToken;
use blanko_core::transport::{AssetRef, ChatTransport, MenuPage, PageAttachment};

use crate::cache::AttachmentCache;
use crate::keyboard;

/// Logical photo asset shown above the main menu.
pub const MAIN_MENU_PHOTO: &str = "main_menu_photo.jpg";
/// Logical photo asset shown above a category's document list.
pub const FILES_MENU_PHOTO: &str = "submenu_photo.jpg";
/// Logical photo asset shown while an artifact is being prepared.
pub const DOWNLOAD_PHOTO: &str = "download_photo.jpg";

/// Where a rendered page should go.
#[derive(Debug, Clone, Copy)]
pub enum PageTarget {
    /// Replace the message the pressed button belongs to.
    Edit(MessageRef),
    /// Send a fresh message to the conversation.
    Send(ConversationId),
}

enum AssetKind {
    Photo,
    Document,
}

pub struct NavigationController {
    tree: Arc<MenuTree>,
    lexicon: Arc<Lexicon>,
    cache: Arc<AttachmentCache>,
    transport: Arc<dyn ChatTransport>,
    photos_dir: PathBuf,
    templates_dir: PathBuf,
    keyboard_width: usize,
}

impl NavigationController {
    pub fn new(
        tree: Arc<MenuTree>,
        lexicon: Arc<Lexicon>,
        cache: Arc<AttachmentCache>,
        transport: Arc<dyn ChatTransport>,
        photos_dir: PathBuf,
        templates_dir: PathBuf,
        keyboard_width: usize,
    ) -> Self {
        Self {
            tree,
            lexicon,
            cache,
            transport,
            photos_dir,
            templates_dir,
            keyboard_width,
        }
    }

    /// Renders the page a menu token points at.
    ///
    /// The codec already rejects levels outside {0, 1, 2};
    /// [`BlankoError::UnknownLevel`] here is defense in depth.
    pub async fn render(&self, token: &MenuToken, target: PageTarget) -> Result<()> {
        debug!(level = token.level, category = %token.category, "rendering menu page");
        match token.level {
            0 => {
                let (attachment, fresh) = self.photo_asset(MAIN_MENU_PHOTO);
                let page = MenuPage {
                    attachment,
                    caption: self.lexicon.text(keys::MAIN_MENU)?.to_string(),
                    keyboard: keyboard::main_menu_keyboard(
                        &self.tree,
                        &self.lexicon,
                        self.keyboard_width,
                    )?,
                };
                self.deliver(page, target, fresh).await
            }
            1 => {
                let (attachment, fresh) = self.photo_asset(FILES_MENU_PHOTO);
                let page = MenuPage {
                    attachment,
                    caption: self.lexicon.text(keys::FILES_MENU)?.to_string(),
                    keyboard: keyboard::documents_keyboard(
                        &self.tree,
                        &self.lexicon,
                        &token.category,
                        self.keyboard_width,
                    )?,
                };
                self.deliver(page, target, fresh).await
            }
            2 => {
                // The page attaches the blank template preview so the user
                // sees what they are about to fill.
                self.tree.documents(&token.category)?;
                let (attachment, fresh) = self.template_asset(&token.document);
                let page = MenuPage {
                    attachment,
                    caption: self.lexicon.text(keys::FILE_PAGE)?.to_string(),
                    keyboard: keyboard::document_page_keyboard(
                        &self.lexicon,
                        &token.category,
                        &token.document,
                    )?,
                };
                self.deliver(page, target, fresh).await
            }
            level => Err(BlankoError::UnknownLevel { level }),
        }
    }

    /// Sends the "please wait" card shown while an artifact is prepared.
    pub async fn send_wait_photo(&self, conversation: ConversationId) -> Result<()> {
        let (attachment, fresh) = self.photo_asset(DOWNLOAD_PHOTO);
        let page = MenuPage {
            attachment,
            caption: self.lexicon.text(keys::WAIT)?.to_string(),
            keyboard: Vec::new(),
        };
        self.deliver(page, PageTarget::Send(conversation), fresh).await
    }

    fn photo_asset(&self, name: &str) -> (PageAttachment, Option<(AssetKind, String)>) {
        match self.cache.photo(name) {
            Some(handle) => (PageAttachment::Photo(AssetRef::Cached(handle)), None),
            None => (
                PageAttachment::Photo(AssetRef::File(self.photos_dir.join(name))),
                Some((AssetKind::Photo, name.to_string())),
            ),
        }
    }

    fn template_asset(&self, document: &str) -> (PageAttachment, Option<(AssetKind, String)>) {
        let name = format!("{document}.pdf");
        match self.cache.document(&name) {
            Some(handle) => (PageAttachment::Document(AssetRef::Cached(handle)), None),
            None => (
                PageAttachment::Document(AssetRef::File(self.templates_dir.join(&name))),
                Some((AssetKind::Document, name)),
            ),
        }
    }

    async fn deliver(
        &self,
        page: MenuPage,
        target: PageTarget,
        fresh: Option<(AssetKind, String)>,
    ) -> Result<()> {
        let delivery = match target {
            PageTarget::Edit(message) => self.transport.edit_menu_page(&message, &page).await?,
            PageTarget::Send(conversation) => {
                self.transport.send_menu_page(conversation, &page).await?
            }
        };

        // First successful upload of this asset: remember the remote handle.
        if let (Some((kind, name)), Some(handle)) = (fresh, delivery.attachment_handle) {
            match kind {
                AssetKind::Photo => self.cache.record_photo(name, handle),
                AssetKind::Document => self.cache.record_document(name, handle),
            }
        }
        Ok(())
    }
}
