//! The single active session and the store that owns it.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};
use tracing::instrument;

use super::directory::{CredentialDirectory, Role};
use crate::error::{AuthError, StorageError};
use crate::storage::{KeyValueStore, USER_KEY};

/// Simulated round-trip of the login call.
pub const DEFAULT_LOGIN_LATENCY: Duration = Duration::from_millis(1500);

const EVENT_BUFFER: usize = 16;

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub identifier: String,
    pub role: Role,
    pub display_name: String,
}

impl Session {
    #[must_use]
    pub fn new(identifier: impl Into<String>, role: Role) -> Self {
        let identifier = identifier.into();
        let display_name = display_name_for(&identifier);
        Self {
            identifier,
            role,
            display_name,
        }
    }

    fn is_well_formed(&self) -> bool {
        !self.identifier.is_empty() && self.identifier.contains('@')
    }
}

/// `"mr.smith@school.com"` → `"MR SMITH"`.
#[must_use]
pub fn display_name_for(identifier: &str) -> String {
    let local = identifier.split('@').next().unwrap_or_default();
    local
        .chars()
        .map(|c| if matches!(c, '.' | '_' | '-') { ' ' } else { c })
        .collect::<String>()
        .to_uppercase()
}

/// Session state transitions, published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}

/// Owns the current [`Session`] and its durable copy under [`USER_KEY`].
///
/// Cloning the store yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    directory: CredentialDirectory,
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
    /// Held across every storage write and the matching `current` update so
    /// the durable record and the in-memory session never diverge.
    write_gate: Mutex<()>,
    latency: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    #[must_use]
    pub fn new(directory: CredentialDirectory, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_latency(directory, storage, DEFAULT_LOGIN_LATENCY)
    }

    #[must_use]
    pub fn with_latency(
        directory: CredentialDirectory,
        storage: Arc<dyn KeyValueStore>,
        latency: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(SessionStoreInner {
                directory,
                storage,
                current: RwLock::new(None),
                write_gate: Mutex::new(()),
                latency,
                events,
            }),
        }
    }

    /// Verify credentials and make the resulting session current.
    ///
    /// Resolves after the configured latency. On failure nothing is persisted
    /// and the current session is left as it was.
    #[instrument(skip(self, secret))]
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        role: Option<Role>,
    ) -> Result<Session, AuthError> {
        tokio::time::sleep(self.inner.latency).await;

        let Some(role) = role else {
            return Err(AuthError::missing_fields());
        };
        if identifier.is_empty() || secret.is_empty() {
            return Err(AuthError::missing_fields());
        }
        if !identifier.contains('@') {
            return Err(AuthError::invalid_identifier());
        }

        if !self.inner.directory.verify(role, identifier, secret) {
            tracing::info!(name: "auth.login.rejected", %role, "credentials rejected");
            return Err(AuthError::Authentication);
        }

        let session = Session::new(identifier, role);
        let record = serde_json::to_string(&session).map_err(StorageError::from)?;

        let _gate = self.inner.write_gate.lock().await;
        self.inner.storage.set(USER_KEY, &record).await?;
        self.set_current(Some(session.clone()));

        tracing::info!(
            name: "auth.login.succeeded",
            identifier = %session.identifier,
            %role,
            "session started"
        );
        let _ = self.inner.events.send(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// End the current session. A no-op when nobody is signed in.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _gate = self.inner.write_gate.lock().await;
        let previous = self.set_current(None);
        if let Err(e) = self.inner.storage.remove(USER_KEY).await {
            tracing::warn!(name: "auth.logout.storage_failed", error = %e, "could not remove stored session");
        }
        if let Some(session) = previous {
            tracing::info!(name: "auth.logout", identifier = %session.identifier, "session ended");
            let _ = self.inner.events.send(SessionEvent::SignedOut);
        }
    }

    /// Adopt a previously persisted session, if a well-formed one exists.
    ///
    /// Absent, unreadable or malformed records all yield `None`.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Option<Session> {
        let _gate = self.inner.write_gate.lock().await;
        let raw = match self.inner.storage.get(USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(name: "auth.restore.storage_failed", error = %e, "could not read stored session");
                return None;
            }
        };

        let session = match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.is_well_formed() => session,
            Ok(_) | Err(_) => {
                tracing::warn!(name: "auth.restore.malformed", "ignoring malformed stored session");
                return None;
            }
        };

        self.set_current(Some(session.clone()));
        tracing::info!(
            name: "auth.restore.succeeded",
            identifier = %session.identifier,
            role = %session.role,
            "session restored"
        );
        let _ = self.inner.events.send(SessionEvent::SignedIn(session.clone()));
        Some(session)
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    #[must_use]
    pub fn directory(&self) -> &CredentialDirectory {
        &self.inner.directory
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn set_current(&self, session: Option<Session>) -> Option<Session> {
        let mut guard = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, session)
    }
}
