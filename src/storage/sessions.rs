use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::storage::results::ResultIndex;

pub type ChatId = i64;

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// State owned by one conversation.
///
/// The result index sits behind an async mutex that command handlers hold
/// for the whole command, so commands within one chat run one at a time.
#[derive(Debug, Default)]
pub struct Session {
    pub results: AsyncMutex<ResultIndex>,
}

#[derive(Debug)]
struct Entry {
    session: Arc<Session>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<ChatId, Entry>,
    tick: u64,
}

/// In-memory sessions keyed by chat. Nothing survives a restart.
///
/// Holds at most `capacity` chats; opening one more ends the least
/// recently used session. A handler still holding the evicted `Arc`
/// finishes its command undisturbed.
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn session(&self, chat_id: ChatId) -> Arc<Session> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        inner.tick += 1;
        let tick = inner.tick;

        if let Some(entry) = inner.entries.get_mut(&chat_id) {
            entry.last_used = tick;
            return entry.session.clone();
        }

        if inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(id, _)| *id);

            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
                debug!(chat_id = oldest, "Evicted least recently used session");
            }
        }

        let session = Arc::new(Session::default());
        inner.entries.insert(
            chat_id,
            Entry {
                session: session.clone(),
                last_used: tick,
            },
        );
        session
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entries
            .len()
    }
}
