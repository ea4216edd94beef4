//! Durable key-value slots.
//!
//! The dashboard keeps a handful of string slots (`user`, `theme-mode`) that
//! must survive a restart. [`KeyValueStore`] abstracts over where they live:
//!
//! - [`MemoryStore`]: process-lifetime map, used by tests and when
//!   `storage.path` is empty
//! - [`FileStore`]: a single JSON object on disk

use async_trait::async_trait;

use crate::error::StorageError;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Slot holding the serialized current session.
pub const USER_KEY: &str = "user";

/// Slot holding the serialized dark-mode flag.
pub const THEME_MODE_KEY: &str = "theme-mode";

#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, leaving every other slot untouched.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
