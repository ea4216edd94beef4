//! Campus ERP backend-for-frontend
//!
//! State services behind an educational-administration dashboard. The
//! dashboard's pages are an external presentation layer that reads these
//! services over HTTP and subscribes to their events.
//!
//! # Modules
//!
//! - [`auth`]: credential directory and the single active session
//! - [`chat`]: conversation logs and assistant responders
//! - [`storage`]: durable key-value slots
//! - [`preferences`]: the dark-mode slot
//! - [`navigation`]: role-gated pages and menus
//! - [`api`] / [`server`]: the axum HTTP surface

#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod navigation;
pub mod preferences;
pub mod server;
pub mod storage;
pub mod telemetry;

use std::fmt;
use std::sync::Arc;

use crate::auth::{CredentialDirectory, SessionStore};
use crate::chat::{CannedResponder, ConversationRegistry, Responder};
use crate::config::AppConfig;
use crate::preferences::ThemePreference;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The signed-in user, if any.
    pub sessions: SessionStore,
    /// Chat conversations by id.
    pub conversations: ConversationRegistry,
    /// Produces assistant replies.
    pub responder: Arc<dyn Responder>,
    /// Dark-mode slot.
    pub theme: ThemePreference,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("conversations", &self.conversations)
            .field("theme", &self.theme)
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Wire every service onto one durable store.
    #[must_use]
    pub fn new(
        config: Arc<AppConfig>,
        storage: Arc<dyn KeyValueStore>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        let sessions = SessionStore::with_latency(
            CredentialDirectory::demo(),
            Arc::clone(&storage),
            config.timing.login_latency(),
        );
        Self {
            sessions,
            conversations: ConversationRegistry::new(config.timing.reply_delay()),
            responder,
            theme: ThemePreference::new(storage),
            config,
        }
    }

    /// State for the binary: file or memory storage per config, canned replies.
    #[must_use]
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let storage: Arc<dyn KeyValueStore> = match config.storage.file_path() {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::new(config, storage, Arc::new(CannedResponder))
    }
}
