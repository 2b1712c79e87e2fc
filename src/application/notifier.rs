// Notification sequencer - transient, auto-dismissing user messages
use crate::domain::notification::{NotificationEntry, NotificationKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

#[derive(Default)]
struct NotifierState {
    entries: Vec<NotificationEntry>,
    timers: HashMap<u64, JoinHandle<()>>,
    closed: bool,
}

#[derive(Clone)]
pub struct Notifier {
    state: Arc<Mutex<NotifierState>>,
    next_id: Arc<AtomicU64>,
    default_ttl: Duration,
}

fn lock(state: &Mutex<NotifierState>) -> MutexGuard<'_, NotifierState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Notifier {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(NotifierState::default())),
            next_id: Arc::new(AtomicU64::new(0)),
            default_ttl,
        }
    }

    /// Append a notification. `ttl` defaults to the configured value; a zero ttl
    /// keeps the entry until it is dismissed. Must be called within a tokio runtime.
    pub fn notify(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        ttl: Option<Duration>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = NotificationEntry::new(id, message.into(), kind, ttl);

        let mut state = lock(&self.state);
        if state.closed {
            tracing::debug!("Dropping notification {} after shutdown: {}", id, entry.message);
            return id;
        }

        tracing::debug!("Notification {} ({:?}): {}", id, kind, entry.message);
        let expires = entry.expires();
        state.entries.push(entry);

        if expires {
            let weak = Arc::downgrade(&self.state);
            let handle = tokio::spawn(expire_after(weak, id, ttl));
            state.timers.insert(id, handle);
        }

        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Success, None)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Error, None)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Info, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Warning, None)
    }

    /// Remove one entry and cancel its timer. Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = lock(&self.state);
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        state.entries.len() != before
    }

    /// Visible entries in insertion order.
    pub fn entries(&self) -> Vec<NotificationEntry> {
        lock(&self.state).entries.clone()
    }

    /// Cancel every pending timer and drop all entries; later calls are ignored.
    pub fn shutdown(&self) {
        let mut state = lock(&self.state);
        state.closed = true;
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.entries.clear();
    }
}

async fn expire_after(state: Weak<Mutex<NotifierState>>, id: u64, ttl: Duration) {
    tokio::time::sleep(ttl).await;
    if let Some(state) = state.upgrade() {
        let mut state = lock(&state);
        state.entries.retain(|e| e.id != id);
        state.timers.remove(&id);
    }
}
