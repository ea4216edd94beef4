//! Chat assistant conversations.
//!
//! - [`ConversationLog`]: ordered, append-only history of one conversation
//! - [`Responder`]: produces the assistant reply; [`CannedResponder`] is the
//!   dashboard's placeholder
//! - [`ConversationRegistry`]: logs keyed by conversation id
//!
//! # Example
//!
//! ```rust
//! use campus_erp::chat::{ConversationLog, Origin};
//!
//! let log = ConversationLog::new("demo");
//! log.append("Hello!", Origin::User);
//! assert_eq!(log.len(), 1);
//! ```

mod log;
mod message;
mod registry;
mod responder;

pub use log::{ConversationLog, DEFAULT_REPLY_DELAY, PendingReply};
pub use message::{ConversationEvent, Message, Origin};
pub use registry::ConversationRegistry;
pub use responder::{CANNED_REPLIES, CannedResponder, Responder};
