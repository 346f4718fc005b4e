//! JSON file backed key-value store
//!
//! The whole store is one JSON object mapping keys to string values. Every
//! write rewrites the file through a temporary sibling and a rename.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::{QuizError, Result};
use crate::storage::kv::{read_lock_error, write_lock_error, KeyValueStore};

/// Key-value store persisted to a single JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// also treated as empty (and logged); it is replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(values) => values,
                Err(e) => {
                    warn!(
                        "State file {} is corrupt, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("State file {} does not exist yet", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                return Err(QuizError::StorageError {
                    message: format!("Failed to read {}: {}", path.display(), e),
                }
                .into())
            }
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let storage_error = |action: &str, e: std::io::Error| QuizError::StorageError {
            message: format!("Failed to {} {}: {}", action, self.path.display(), e),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| storage_error("create directory for", e))?;
        }

        let contents = serde_json::to_string_pretty(values)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, contents).map_err(|e| storage_error("write", e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| storage_error("replace", e))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| read_lock_error())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut values = self.values.write().map_err(|_| write_lock_error())?;
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
        let mut values = self.values.write().map_err(|_| write_lock_error())?;
        values.extend(entries);
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut values = self.values.write().map_err(|_| write_lock_error())?;
        let removed = values.remove(key).is_some();
        if removed {
            self.flush(&values)?;
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let values = self.values.read().map_err(|_| read_lock_error())?;
        Ok(values.keys().cloned().collect())
    }
}
