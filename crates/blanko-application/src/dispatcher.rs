//! Update dispatcher.
//!
//! Fans incoming chat events out to one worker task per conversation, so a
//! conversation's updates are processed strictly in arrival order while
//! different conversations proceed independently. Also hosts the idle
//! sweeper that clears abandoned fills.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use blanko_core::config::SessionConfig;
use blanko_core::ids::ConversationId;
use blanko_core::session::SessionStore;
use blanko_core::transport::{Incoming, UpdateHandler};

/// Queued updates per conversation before dispatch applies backpressure.
const QUEUE_DEPTH: usize = 32;

pub struct Dispatcher {
    handler: Arc<dyn UpdateHandler>,
    store: SessionStore,
    workers: Mutex<HashMap<ConversationId, mpsc::Sender<Incoming>>>,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn UpdateHandler>, store: SessionStore) -> Arc<Self> {
        Arc::new(Self {
            handler,
            store,
            workers: Mutex::new(HashMap::new()),
        })
    }

    /// Queues an update behind everything already in flight for its
    /// conversation.
    pub async fn dispatch(&self, incoming: Incoming) {
        let conversation = incoming.conversation();
        let sender = {
            let mut workers = self.workers.lock().await;
            workers
                .entry(conversation)
                .or_insert_with(|| self.spawn_worker(conversation))
                .clone()
        };
        if sender.send(incoming).await.is_err() {
            warn!(%conversation, "worker gone, update dropped");
        }
    }

    fn spawn_worker(&self, conversation: ConversationId) -> mpsc::Sender<Incoming> {
        let (tx, mut rx) = mpsc::channel::<Incoming>(QUEUE_DEPTH);
        let handler = self.handler.clone();
        tokio::spawn(async move {
            while let Some(incoming) = rx.recv().await {
                // Transport failures land here; the core does not retry
                // them and neither does the worker.
                if let Err(err) = handler.handle(incoming).await {
                    error!(%conversation, %err, "update handling failed");
                }
            }
        });
        tx
    }

    /// Spawns the background task clearing fills idle beyond the configured
    /// timeout.
    pub fn start_idle_sweeper(&self, config: &SessionConfig) -> JoinHandle<()> {
        let store = self.store.clone();
        let max_idle = Duration::from_secs(config.idle_timeout_secs);
        let every = Duration::from_secs(config.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                for conversation in store.expire_idle(max_idle).await {
                    info!(%conversation, "abandoned fill cleared");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blanko_core::catalog::default_field_chains;
    use blanko_core::error::Result;
    use blanko_core::ids::{MessageId, MessageRef};
    use blanko_core::session::SessionMode;
    use std::sync::Mutex as StdMutex;

    struct RecordingHandler {
        seen: StdMutex<Vec<(ConversationId, String)>>,
    }

    #[async_trait]
    impl UpdateHandler for RecordingHandler {
        async fn handle(&self, incoming: Incoming) -> Result<()> {
            let conversation = incoming.conversation();
            let text = match &incoming {
                Incoming::Message { text, .. } => text.clone(),
                other => format!("{other:?}"),
            };
            // Yield so another conversation's worker can interleave; the
            // per-conversation queue must still keep arrival order.
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.seen.lock().unwrap().push((conversation, text));
            Ok(())
        }
    }

    fn message(conversation: i64, text: &str) -> Incoming {
        Incoming::Message {
            message: MessageRef::new(ConversationId(conversation), MessageId(1)),
            text: text.to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn per_conversation_order_is_preserved() {
        let handler = Arc::new(RecordingHandler {
            seen: StdMutex::new(Vec::new()),
        });
        let dispatcher = Dispatcher::new(handler.clone(), SessionStore::new());

        for i in 0..5 {
            dispatcher.dispatch(message(1, &format!("a{i}"))).await;
            dispatcher.dispatch(message(2, &format!("b{i}"))).await;
        }

        // Wait for both queues to drain.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let seen = handler.seen.lock().unwrap();
        let for_conversation = |id: i64| -> Vec<String> {
            seen.iter()
                .filter(|(c, _)| *c == ConversationId(id))
                .map(|(_, t)| t.clone())
                .collect()
        };
        assert_eq!(for_conversation(1), vec!["a0", "a1", "a2", "a3", "a4"]);
        assert_eq!(for_conversation(2), vec!["b0", "b1", "b2", "b3", "b4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_clears_abandoned_fills() {
        struct NoopHandler;

        #[async_trait]
        impl UpdateHandler for NoopHandler {
            async fn handle(&self, _incoming: Incoming) -> Result<()> {
                Ok(())
            }
        }

        let store = SessionStore::new();
        let chain = default_field_chains()
            .chain_for("only_text")
            .unwrap()
            .to_vec();
        store
            .begin(ConversationId(9), "Category 2", "only_text", chain)
            .await
            .unwrap();

        let dispatcher = Dispatcher::new(Arc::new(NoopHandler), store.clone());
        let sweeper = dispatcher.start_idle_sweeper(&SessionConfig {
            idle_timeout_secs: 0,
            sweep_interval_secs: 1,
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.mode(ConversationId(9)).await, SessionMode::Default);
        sweeper.abort();
    }
}
