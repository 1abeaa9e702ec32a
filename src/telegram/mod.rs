use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::SendError, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::bot::service::SearchBot;
use crate::storage::sessions::ChatId;

pub mod client;
pub mod models;

pub use client::TelegramClient;

const RETRY_DELAY: Duration = Duration::from_secs(5);
const WORKER_IDLE: Duration = Duration::from_secs(300);

/// Where replies go.
#[async_trait]
pub trait ReplySink: Send + Sync + 'static {
    async fn send(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl ReplySink for TelegramClient {
    async fn send(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
        self.send_message(chat_id, text).await
    }
}

/// Routes messages to one worker task per chat.
///
/// A worker handles its chat's messages strictly in arrival order and sends
/// all replies to one message before taking the next, so digests of two
/// back-to-back searches never interleave. Chats run independently. Workers
/// exit after `idle` without messages and are respawned on demand.
pub struct Dispatcher {
    bot: Arc<SearchBot>,
    sink: Arc<dyn ReplySink>,
    workers: HashMap<ChatId, UnboundedSender<String>>,
    idle: Duration,
}

impl Dispatcher {
    pub fn new(bot: Arc<SearchBot>, sink: Arc<dyn ReplySink>, idle: Duration) -> Self {
        Self {
            bot,
            sink,
            workers: HashMap::new(),
            idle,
        }
    }

    pub fn dispatch(&mut self, chat_id: ChatId, text: String) {
        let text = match self.workers.get(&chat_id) {
            Some(tx) => match tx.send(text) {
                Ok(()) => return,
                Err(SendError(text)) => text,
            },
            None => text,
        };

        self.workers.retain(|_, tx| !tx.is_closed());

        let (tx, rx) = mpsc::unbounded_channel();
        // rx is alive here, so this cannot fail
        let _ = tx.send(text);
        self.workers.insert(chat_id, tx);

        debug!(chat_id, workers = self.workers.len(), "Spawning chat worker");
        tokio::spawn(run_worker(
            self.bot.clone(),
            self.sink.clone(),
            chat_id,
            rx,
            self.idle,
        ));
    }
}

async fn run_worker(
    bot: Arc<SearchBot>,
    sink: Arc<dyn ReplySink>,
    chat_id: ChatId,
    mut rx: UnboundedReceiver<String>,
    idle: Duration,
) {
    loop {
        match timeout(idle, rx.recv()).await {
            Ok(Some(text)) => reply(&bot, sink.as_ref(), chat_id, &text).await,
            Ok(None) => break,
            Err(_) => {
                // refuse new messages, then finish whatever slipped in
                rx.close();
                while let Ok(text) = rx.try_recv() {
                    reply(&bot, sink.as_ref(), chat_id, &text).await;
                }
                break;
            }
        }
    }

    debug!(chat_id, "Chat worker stopped");
}

async fn reply(bot: &SearchBot, sink: &dyn ReplySink, chat_id: ChatId, text: &str) {
    let replies = bot.handle(chat_id, text).await;

    for reply in &replies {
        if let Err(e) = sink.send(chat_id, reply).await {
            error!(chat_id, error = %e, "Failed to send reply");
            return;
        }
    }

    if !replies.is_empty() {
        info!(chat_id, sent = replies.len(), "Replied");
    }
}

/// Long-polls for updates forever.
pub async fn run(client: TelegramClient, bot: Arc<SearchBot>) -> anyhow::Result<()> {
    let mut dispatcher = Dispatcher::new(bot, Arc::new(client.clone()), WORKER_IDLE);
    let mut offset = 0;

    loop {
        let updates = match client.get_updates(offset).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Polling failed, retrying");
                sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };

            debug!(
                chat_id = message.chat.id,
                update_id = update.update_id,
                "Received message"
            );
            dispatcher.dispatch(message.chat.id, text);
        }
    }
}
