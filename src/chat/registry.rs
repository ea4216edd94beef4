use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use uuid::Uuid;

use super::log::{ConversationLog, DEFAULT_REPLY_DELAY};

/// Conversation logs keyed by id.
///
/// Each log keeps its own lock and its own pending-reply guard; the registry
/// only owns the map.
#[derive(Debug, Clone)]
pub struct ConversationRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    logs: RwLock<HashMap<String, ConversationLog>>,
    reply_delay: Duration,
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY)
    }
}

impl ConversationRegistry {
    #[must_use]
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                logs: RwLock::new(HashMap::new()),
                reply_delay,
            }),
        }
    }

    /// Open a conversation under a fresh id.
    #[must_use]
    pub fn create(&self) -> ConversationLog {
        self.get_or_create(&Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<ConversationLog> {
        let guard = self.inner.logs.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(id).cloned()
    }

    #[must_use]
    pub fn get_or_create(&self, id: &str) -> ConversationLog {
        if let Some(log) = self.get(id) {
            return log;
        }
        let mut guard = self.inner.logs.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(id.to_string())
            .or_insert_with(|| ConversationLog::with_reply_delay(id, self.inner.reply_delay))
            .clone()
    }

    pub fn remove(&self, id: &str) -> Option<ConversationLog> {
        let mut guard = self.inner.logs.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(id)
    }

    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        let guard = self.inner.logs.read().unwrap_or_else(PoisonError::into_inner);
        guard.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .logs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
