//! Producers of assistant replies.

use async_trait::async_trait;
use rand::Rng;

use super::message::Message;

/// Turns the conversation so far into the assistant's next reply.
///
/// Any `Fn(&[Message]) -> String` closure is a responder, so tests and
/// alternative backends can plug in without touching the log.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, history: &[Message]) -> String;
}

#[async_trait]
impl<F> Responder for F
where
    F: Fn(&[Message]) -> String + Send + Sync,
{
    async fn respond(&self, history: &[Message]) -> String {
        self(history)
    }
}

pub const CANNED_REPLIES: [&str; 8] = [
    "That's a great question! Let me help you with that.",
    "I understand what you're asking. Here's what I can tell you...",
    "Excellent! This is something I can definitely assist with.",
    "Thank you for asking. Let me provide you with some insights.",
    "I'll be happy to help you with this. Here are some key points...",
    "Great observation! This is an important topic in educational management.",
    "I'm here to help! This is a common question among educators.",
    "Absolutely, I can provide guidance on this matter.",
];

/// Picks one of [`CANNED_REPLIES`] uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedResponder;

#[async_trait]
impl Responder for CannedResponder {
    async fn respond(&self, _history: &[Message]) -> String {
        let idx = rand::thread_rng().gen_range(0..CANNED_REPLIES.len());
        CANNED_REPLIES[idx].to_string()
    }
}
