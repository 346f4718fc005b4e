//! Persistence of quiz state
//!
//! This module defines the key-value store interface with in-memory and
//! JSON-file implementations, and the repository that maps a quiz session
//! onto store keys.

pub mod file;
pub mod kv;
pub mod persistence;

// Re-export commonly used types
pub use file::FileStore;
pub use kv::{InMemoryStore, KeyValueStore};
pub use persistence::{SessionRepository, StateKeys, DEFAULT_KEY_PREFIX};
