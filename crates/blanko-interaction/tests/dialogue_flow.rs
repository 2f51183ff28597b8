//! End-to-end engine tests over a recording transport and a mock renderer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use blanko_core::catalog::{default_field_chains, default_menu_tree};
use blanko_core::error::{BlankoError, Result};
use blanko_core::ids::{ConversationId, MessageId, MessageRef};
use blanko_core::lexicon::default_lexicon;
use blanko_core::render::{RenderedDocument, TemplateRenderer};
use blanko_core::session::{SessionMode, SessionStore};
use blanko_core::token::{FillToken, MenuToken};
use blanko_core::transport::{
    AssetRef, ChatTransport, Delivery, Incoming, MenuPage, PageAttachment, UpdateHandler,
};

use blanko_interaction::{
    AttachmentCache, DialogueMachine, NavigationController, UpdateRouter,
};

const USER: ConversationId = ConversationId(42);

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Menu {
        edited: bool,
        caption: String,
        payloads: Vec<String>,
        cached_attachment: bool,
    },
    Document {
        filename: String,
    },
    KeyboardRemoved,
    MessageDeleted,
    Text {
        text: String,
    },
}

#[derive(Default)]
struct RecordingTransport {
    events: Mutex<Vec<Sent>>,
    next_message: AtomicI64,
}

impl RecordingTransport {
    fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn record_menu(&self, edited: bool, page: &MenuPage) -> Delivery {
        let (cached, handle) = match &page.attachment {
            PageAttachment::Photo(AssetRef::File(path))
            | PageAttachment::Document(AssetRef::File(path)) => (
                false,
                Some(format!(
                    "remote-{}",
                    path.file_name().unwrap().to_string_lossy()
                )),
            ),
            _ => (true, None),
        };
        self.events.lock().unwrap().push(Sent::Menu {
            edited,
            caption: page.caption.clone(),
            payloads: page
                .keyboard
                .iter()
                .flatten()
                .map(|b| b.payload.clone())
                .collect(),
            cached_attachment: cached,
        });
        Delivery {
            message: MessageRef::new(
                USER,
                MessageId(self.next_message.fetch_add(1, Ordering::SeqCst)),
            ),
            attachment_handle: handle,
        }
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_menu_page(
        &self,
        _conversation: ConversationId,
        page: &MenuPage,
    ) -> Result<Delivery> {
        Ok(self.record_menu(false, page))
    }

    async fn edit_menu_page(&self, _message: &MessageRef, page: &MenuPage) -> Result<Delivery> {
        Ok(self.record_menu(true, page))
    }

    async fn send_document(
        &self,
        _conversation: ConversationId,
        file: &Path,
        filename: &str,
        _caption: &str,
    ) -> Result<Delivery> {
        assert!(file.exists(), "artifact must exist while being sent");
        self.events.lock().unwrap().push(Sent::Document {
            filename: filename.to_string(),
        });
        Ok(Delivery {
            message: MessageRef::new(
                USER,
                MessageId(self.next_message.fetch_add(1, Ordering::SeqCst)),
            ),
            attachment_handle: None,
        })
    }

    async fn remove_keyboard(&self, _message: &MessageRef) -> Result<()> {
        self.events.lock().unwrap().push(Sent::KeyboardRemoved);
        Ok(())
    }

    async fn delete_message(&self, _message: &MessageRef) -> Result<()> {
        self.events.lock().unwrap().push(Sent::MessageDeleted);
        Ok(())
    }

    async fn send_text(&self, _conversation: ConversationId, text: &str) -> Result<()> {
        self.events.lock().unwrap().push(Sent::Text {
            text: text.to_string(),
        });
        Ok(())
    }
}

struct MockRenderer {
    dir: PathBuf,
    fail: AtomicBool,
    seen_fields: Mutex<Option<HashMap<String, String>>>,
}

impl MockRenderer {
    fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            fail: AtomicBool::new(false),
            seen_fields: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TemplateRenderer for MockRenderer {
    async fn render(
        &self,
        document: &str,
        conversation: ConversationId,
        fields: &HashMap<String, String>,
    ) -> Result<RenderedDocument> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BlankoError::render("typesetter exited with status 1"));
        }
        *self.seen_fields.lock().unwrap() = Some(fields.clone());
        let path = self.dir.join(format!("{document}-{conversation}.pdf"));
        std::fs::write(&path, b"%PDF-mock")?;
        Ok(RenderedDocument::new(path))
    }
}

struct Harness {
    router: UpdateRouter,
    transport: Arc<RecordingTransport>,
    renderer: Arc<MockRenderer>,
    store: SessionStore,
    _work_dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let renderer = Arc::new(MockRenderer::new(work_dir.path().to_path_buf()));
        let store = SessionStore::new();

        let tree = Arc::new(default_menu_tree());
        let lexicon = Arc::new(default_lexicon());
        let chains = Arc::new(default_field_chains());
        let cache = Arc::new(AttachmentCache::new());

        let navigation = Arc::new(NavigationController::new(
            tree,
            lexicon.clone(),
            cache,
            transport.clone(),
            PathBuf::from("assets/photos"),
            PathBuf::from("assets/templates"),
            3,
        ));
        let dialogue = Arc::new(DialogueMachine::new(
            store.clone(),
            chains,
            lexicon.clone(),
            transport.clone(),
            renderer.clone(),
            navigation.clone(),
        ));
        let router = UpdateRouter::new(
            navigation,
            dialogue,
            store.clone(),
            lexicon,
            transport.clone(),
        );

        Self {
            router,
            transport,
            renderer,
            store,
            _work_dir: work_dir,
        }
    }

    async fn press(&self, payload: String) {
        self.router
            .handle(Incoming::CallbackPress {
                message: MessageRef::new(USER, MessageId(500)),
                payload,
            })
            .await
            .unwrap();
    }

    async fn say(&self, text: &str) {
        self.router
            .handle(Incoming::Message {
                message: MessageRef::new(USER, MessageId(501)),
                text: text.to_string(),
            })
            .await
            .unwrap();
    }
}

fn payloads_of(event: &Sent) -> &[String] {
    match event {
        Sent::Menu { payloads, .. } => payloads,
        other => panic!("expected a menu event, got {other:?}"),
    }
}

#[tokio::test]
async fn full_fill_scenario() {
    let h = Harness::new();

    // /start greets and opens the main menu.
    h.router
        .handle(Incoming::Command {
            conversation: USER,
            name: "start".to_string(),
        })
        .await
        .unwrap();

    let events = h.transport.take();
    assert_eq!(
        events[0],
        Sent::Text {
            text: "Описание этого бота и его команд".to_string()
        }
    );
    assert_eq!(
        payloads_of(&events[1]),
        &[
            MenuToken::category("Category 1").encode().unwrap(),
            MenuToken::category("Category 2").encode().unwrap(),
        ]
    );

    // Category 2 lists only_text and diploma_cover plus one back button.
    h.press(MenuToken::category("Category 2").encode().unwrap())
        .await;
    let events = h.transport.take();
    assert_eq!(
        payloads_of(&events[0]),
        &[
            MenuToken::document("Category 2", "only_text").encode().unwrap(),
            MenuToken::document("Category 2", "diploma_cover")
                .encode()
                .unwrap(),
            MenuToken::main().encode().unwrap(),
        ]
    );

    // The document page exposes exactly fill and back.
    h.press(
        MenuToken::document("Category 2", "only_text")
            .encode()
            .unwrap(),
    )
    .await;
    let events = h.transport.take();
    assert_eq!(
        payloads_of(&events[0]),
        &[
            FillToken::new("Category 2", "only_text").encode().unwrap(),
            MenuToken::category("Category 2").encode().unwrap(),
        ]
    );

    // Fill: keyboard goes away, first field is prompted.
    h.press(FillToken::new("Category 2", "only_text").encode().unwrap())
        .await;
    let events = h.transport.take();
    assert_eq!(events[0], Sent::KeyboardRemoved);
    assert_eq!(
        events[1],
        Sent::Text {
            text: "Введите имя".to_string()
        }
    );
    assert_eq!(h.store.mode(USER).await, SessionMode::Collecting);

    // only_text has a single real field, so the next prompt asks for the
    // output filename.
    h.say("Ivan").await;
    let events = h.transport.take();
    assert_eq!(
        events[0],
        Sent::Text {
            text: "Введите название документа".to_string()
        }
    );
    assert_eq!(h.store.mode(USER).await, SessionMode::AwaitingFilename);

    // The filename finishes the dialogue: wait card, artifact, return to
    // the document page, session cleared.
    h.say("myfile").await;
    let events = h.transport.take();
    assert!(matches!(
        &events[0],
        Sent::Menu { edited: false, caption, .. }
            if caption == "Пожалуйста, подождите немного, документ готовится"
    ));
    assert_eq!(
        events[1],
        Sent::Document {
            filename: "myfile.pdf".to_string()
        }
    );
    assert!(matches!(&events[2], Sent::Menu { edited: false, .. }));
    assert_eq!(h.store.mode(USER).await, SessionMode::Default);

    let fields = h.renderer.seen_fields.lock().unwrap().clone().unwrap();
    assert_eq!(fields.get("name").unwrap(), "Ivan");

    // With the session gone, further messages are noise again.
    h.say("hello?").await;
    assert_eq!(h.transport.take(), vec![Sent::MessageDeleted]);
}

#[tokio::test]
async fn duplicate_fill_press_is_inert() {
    let h = Harness::new();
    h.press(FillToken::new("Category 1", "diploma_cover").encode().unwrap())
        .await;
    h.say("Anna").await;
    h.transport.take();

    // Pressing fill again (same or another document) must not disturb the
    // running session.
    h.press(FillToken::new("Category 2", "only_text").encode().unwrap())
        .await;
    assert_eq!(h.transport.take(), Vec::<Sent>::new());

    let session = h.store.snapshot(USER).await.unwrap();
    assert_eq!(session.document, "diploma_cover");
    assert_eq!(session.values.get("name").unwrap(), "Anna");
    assert_eq!(session.cursor, 1);
}

#[tokio::test]
async fn render_failure_keeps_the_session_for_retry() {
    let h = Harness::new();
    h.press(FillToken::new("Category 2", "only_text").encode().unwrap())
        .await;
    h.say("Ivan").await;
    h.transport.take();

    h.renderer.fail.store(true, Ordering::SeqCst);
    h.say("myfile").await;
    let events = h.transport.take();
    assert!(matches!(&events[1], Sent::Text { text }
        if text == "Не получилось подготовить документ, попробуйте прислать название ещё раз"));
    assert_eq!(h.store.mode(USER).await, SessionMode::AwaitingFilename);

    // Retrying the filename after the renderer recovers succeeds.
    h.renderer.fail.store(false, Ordering::SeqCst);
    h.say("second_try").await;
    let events = h.transport.take();
    assert!(events.contains(&Sent::Document {
        filename: "second_try.pdf".to_string()
    }));
    assert_eq!(h.store.mode(USER).await, SessionMode::Default);
}

#[tokio::test]
async fn menu_assets_upload_only_once() {
    let h = Harness::new();
    let start = Incoming::Command {
        conversation: USER,
        name: "start".to_string(),
    };

    h.router.handle(start.clone()).await.unwrap();
    let events = h.transport.take();
    assert!(matches!(
        &events[1],
        Sent::Menu { cached_attachment: false, .. }
    ));

    h.router.handle(start).await.unwrap();
    let events = h.transport.take();
    assert!(matches!(
        &events[1],
        Sent::Menu { cached_attachment: true, .. }
    ));
}

#[tokio::test]
async fn malformed_payload_surfaces_a_notice() {
    let h = Harness::new();
    h.press("menu:nonsense".to_string()).await;
    let events = h.transport.take();
    assert_eq!(
        events,
        vec![Sent::Text {
            text: "Что-то пошло не так, попробуйте ещё раз".to_string()
        }]
    );
}
