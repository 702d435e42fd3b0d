//! Save/load persistence
//!
//! Features:
//! - LocalStorage-style string key-value backends (memory, JSON file)
//! - Atomic file writes (tmp → rename)
//! - Corruption detection: unreadable files are moved aside
//! - Namespaced high score, settings and stats records with safe defaults

pub mod manager;
pub mod store;

pub use manager::{DEFAULT_NAMESPACE, StorageManager};
pub use store::{FileStorage, MemoryStorage, Storage, StorageError};
