use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::category::{Category, default_categories};
use crate::model::config::StorageConfig;
use crate::model::task::Task;

/// Everything the store persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
}

impl Default for Snapshot {
    /// First-run state: no tasks, the default categories.
    fn default() -> Self {
        Snapshot {
            tasks: Vec::new(),
            categories: default_categories(),
        }
    }
}

/// Reads and writes the task and category blobs on a key-value medium.
pub struct PersistenceAdapter<S: KeyValueStore> {
    store: S,
    keys: StorageConfig,
    recovery_dir: Option<PathBuf>,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    /// Adapter with the default keys. Unreadable data is preserved in the
    /// recovery log when the medium has a data directory.
    pub fn new(store: S) -> Self {
        let recovery_dir = store.data_dir().map(|d| d.to_path_buf());
        PersistenceAdapter {
            store,
            keys: StorageConfig::default(),
            recovery_dir,
        }
    }

    pub fn with_keys(mut self, keys: StorageConfig) -> Self {
        self.keys = keys;
        self
    }

    pub fn without_recovery_log(mut self) -> Self {
        self.recovery_dir = None;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Restore persisted state. Never fails: a missing or unreadable blob
    /// falls back to empty tasks / default categories.
    pub fn load(&self) -> Snapshot {
        let tasks = self
            .read_blob::<Vec<Task>>(&self.keys.tasks_key)
            .unwrap_or_default();
        let categories = self
            .read_blob::<Vec<Category>>(&self.keys.categories_key)
            .unwrap_or_else(default_categories);
        tracing::debug!(
            tasks = tasks.len(),
            categories = categories.len(),
            "loaded snapshot"
        );
        Snapshot { tasks, categories }
    }

    /// Rewrite both blobs. Both writes are attempted; the first error is returned.
    pub fn save(&mut self, tasks: &[Task], categories: &[Category]) -> Result<(), StorageError> {
        let tasks_key = self.keys.tasks_key.clone();
        let categories_key = self.keys.categories_key.clone();
        let tasks_result = self.write_blob(&tasks_key, tasks);
        let categories_result = self.write_blob(&categories_key, categories);
        tasks_result.and(categories_result)
    }

    fn read_blob<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "nothing stored, using defaults");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "could not read stored data, using defaults");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "could not parse stored data, using defaults");
                self.note_recovery(RecoveryCategory::Parse, key, &e.to_string(), raw);
                None
            }
        }
    }

    fn write_blob<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let content = serde_json::to_string(value).map_err(|e| StorageError::SerializeError {
            key: key.to_string(),
            source: e,
        })?;
        if let Err(e) = self.store.set(key, &content) {
            tracing::warn!(key, error = %e, "write failed");
            self.note_recovery(RecoveryCategory::Write, key, &e.to_string(), content);
            return Err(e);
        }
        Ok(())
    }

    fn note_recovery(&self, category: RecoveryCategory, key: &str, error: &str, body: String) {
        let Some(dir) = &self.recovery_dir else {
            return;
        };
        if latest_logged_body(dir, category, key).as_deref() == Some(body.trim_end_matches('\n')) {
            tracing::debug!(key, %category, "recovery log already holds this data");
            return;
        }
        let description = match category {
            RecoveryCategory::Parse => format!("{} blob unreadable", key),
            RecoveryCategory::Write => format!("{} blob not saved", key),
        };
        recovery::log_recovery(
            dir,
            RecoveryEntry {
                timestamp: Utc::now(),
                category,
                description,
                fields: vec![
                    (KEY_FIELD.to_string(), key.to_string()),
                    ("Error".to_string(), error.to_string()),
                ],
                body,
            },
        );
    }
}

/// Recovery entry field naming the blob an entry belongs to.
const KEY_FIELD: &str = "Key";

/// Body of the newest `category` entry logged for `key`.
fn latest_logged_body(dir: &Path, category: RecoveryCategory, key: &str) -> Option<String> {
    recovery::read_recovery_entries(dir, None)
        .into_iter()
        .find(|e| {
            e.category == category && e.fields.iter().any(|(k, v)| k == KEY_FIELD && v == key)
        })
        .map(|e| e.body.trim_end_matches('\n').to_string())
}
