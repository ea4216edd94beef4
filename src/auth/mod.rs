//! Role-scoped authentication.
//!
//! A fixed [`CredentialDirectory`] is checked on login and at most one
//! [`Session`] is current at a time. The session is mirrored into the durable
//! `user` slot so it can be restored after a restart.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use campus_erp::auth::{CredentialDirectory, Role, SessionStore};
//! use campus_erp::storage::MemoryStore;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = SessionStore::with_latency(
//!     CredentialDirectory::demo(),
//!     Arc::new(MemoryStore::new()),
//!     Duration::ZERO,
//! );
//! let session = store
//!     .login("teacher@school.com", "password123", Some(Role::Teacher))
//!     .await
//!     .unwrap();
//! assert_eq!(session.display_name, "TEACHER");
//! # });
//! ```

mod directory;
mod session;

pub use directory::{CredentialDirectory, Role};
pub use session::{DEFAULT_LOGIN_LATENCY, Session, SessionEvent, SessionStore, display_name_for};
