//! Key-value store interface and in-memory implementation
//!
//! Persisted quiz state is a handful of string values under well-known
//! keys, the same shape as browser local storage.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{QuizError, Result};

/// Trait for string key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Store several values at once
    fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
        for (key, value) in entries {
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Remove `key`, returning whether it existed
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>>;
}

pub(crate) fn read_lock_error() -> QuizError {
    QuizError::InternalError {
        message: "Failed to acquire store read lock".to_string(),
    }
}

pub(crate) fn write_lock_error() -> QuizError {
    QuizError::InternalError {
        message: "Failed to acquire store write lock".to_string(),
    }
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `values` (for testing)
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| read_lock_error())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut values = self.values.write().map_err(|_| write_lock_error())?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
        let mut values = self.values.write().map_err(|_| write_lock_error())?;
        values.extend(entries);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut values = self.values.write().map_err(|_| write_lock_error())?;
        Ok(values.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let values = self.values.read().map_err(|_| read_lock_error())?;
        let mut keys: Vec<String> = values.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_basic_operations() {
        let store = InMemoryStore::new();

        // Initially empty
        assert!(store.get("elo").unwrap().is_none());

        store.set("elo", "816".to_string()).unwrap();
        assert_eq!(store.get("elo").unwrap().as_deref(), Some("816"));

        store.set("elo", "832".to_string()).unwrap();
        assert_eq!(store.get("elo").unwrap().as_deref(), Some("832"));

        assert!(store.remove("elo").unwrap());
        assert!(!store.remove("elo").unwrap());
        assert!(store.get("elo").unwrap().is_none());
    }

    #[test]
    fn test_set_many_and_keys() {
        let store = InMemoryStore::new();
        store
            .set_many(vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
            ])
            .unwrap();

        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_with_values() {
        let store = InMemoryStore::with_values([("elo", "900")]);
        assert_eq!(store.get("elo").unwrap().as_deref(), Some("900"));
    }
}
