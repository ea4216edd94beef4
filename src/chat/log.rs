//! Ordered message history with a single in-flight assistant reply.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::instrument;

use super::message::{ConversationEvent, Message, Origin};
use super::responder::Responder;
use crate::error::ChatError;

/// Delay before the assistant reply lands.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);

const EVENT_BUFFER: usize = 64;

/// Append-only conversation log.
///
/// Cloning yields another handle to the same log.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    inner: Arc<LogInner>,
}

#[derive(Debug)]
struct LogInner {
    id: String,
    state: RwLock<LogState>,
    awaiting_reply: AtomicBool,
    reply_delay: Duration,
    events: broadcast::Sender<ConversationEvent>,
}

#[derive(Debug, Default)]
struct LogState {
    messages: Vec<Message>,
    next_seq: u64,
    last_at: Option<DateTime<Utc>>,
}

/// Handle to a reply that is still being produced.
///
/// Dropping it does not cancel the reply.
#[derive(Debug)]
pub struct PendingReply {
    user_message: Message,
    handle: JoinHandle<Option<Message>>,
}

impl PendingReply {
    /// The user message appended when the reply was requested.
    #[must_use]
    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    /// Wait for the assistant message.
    ///
    /// `None` when the responder produced an empty reply or panicked.
    pub async fn wait(self) -> Option<Message> {
        self.handle.await.ok().flatten()
    }
}

/// Lowers the awaiting flag even if the responder panics.
struct AwaitingGuard(Arc<LogInner>);

impl Drop for AwaitingGuard {
    fn drop(&mut self) {
        self.0.awaiting_reply.store(false, Ordering::Release);
        let _ = self.0.events.send(ConversationEvent::AwaitingReply(false));
    }
}

impl ConversationLog {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_reply_delay(id, DEFAULT_REPLY_DELAY)
    }

    #[must_use]
    pub fn with_reply_delay(id: impl Into<String>, reply_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(LogInner {
                id: id.into(),
                state: RwLock::new(LogState::default()),
                awaiting_reply: AtomicBool::new(false),
                reply_delay,
                events,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Append a message stamped with the current time.
    ///
    /// Non-empty content is the caller's responsibility.
    pub fn append(&self, content: impl Into<String>, origin: Origin) -> Message {
        let message = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            // never step backwards, even if the wall clock does
            let now = Utc::now();
            let created_at = state.last_at.map_or(now, |last| last.max(now));
            let seq = state.next_seq;
            state.next_seq += 1;
            state.last_at = Some(created_at);

            let message = Message {
                id: format!("{}-{seq}", created_at.timestamp_millis()),
                content: content.into(),
                origin,
                created_at,
            };
            state.messages.push(message.clone());
            message
        };

        tracing::debug!(
            name: "chat.message.appended",
            conversation_id = %self.inner.id,
            message_id = %message.id,
            origin = ?message.origin,
            "message appended"
        );
        let _ = self
            .inner
            .events
            .send(ConversationEvent::MessageAppended(message.clone()));
        message
    }

    /// Drop every message. A pending reply still lands afterwards.
    pub fn clear(&self) {
        {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            state.messages.clear();
        }
        tracing::debug!(name: "chat.cleared", conversation_id = %self.inner.id, "conversation cleared");
        let _ = self.inner.events.send(ConversationEvent::Cleared);
    }

    /// Append `user_content` now and schedule the responder's reply.
    ///
    /// Only one reply may be pending at a time; a second request fails with
    /// [`ChatError::Busy`] and appends nothing. Must be called from within a
    /// tokio runtime.
    #[instrument(skip(self, user_content, responder), fields(conversation_id = %self.inner.id))]
    pub fn request_reply(
        &self,
        user_content: impl Into<String>,
        responder: Arc<dyn Responder>,
    ) -> Result<PendingReply, ChatError> {
        if self
            .inner
            .awaiting_reply
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!(name: "chat.reply.busy", "reply already pending");
            return Err(ChatError::Busy);
        }
        let guard = AwaitingGuard(Arc::clone(&self.inner));

        let user_message = self.append(user_content, Origin::User);
        let _ = self.inner.events.send(ConversationEvent::AwaitingReply(true));

        let log = self.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            tokio::time::sleep(log.inner.reply_delay).await;

            let history = log.messages();
            let reply = responder.respond(&history).await;
            if reply.trim().is_empty() {
                tracing::warn!(
                    name: "chat.reply.empty",
                    conversation_id = %log.inner.id,
                    "responder produced an empty reply"
                );
                return None;
            }
            Some(log.append(reply, Origin::Assistant))
        });

        Ok(PendingReply {
            user_message,
            handle,
        })
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_awaiting_reply(&self) -> bool {
        self.inner.awaiting_reply.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.inner.events.subscribe()
    }
}
