//! Preference store implementations

use super::PreferenceStore;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Preferences held in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<JsonObject>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_object(&self, key: &str) -> Result<Option<JsonValue>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set_object(&self, key: &str, value: JsonValue) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences persisted to a JSON file.
///
/// The file is read when the store is opened and rewritten atomically on
/// every change.
#[derive(Debug)]
pub struct FileStore {
    /// Path to the preferences file
    path: PathBuf,
    /// Current values (cached)
    values: RwLock<JsonObject>,
}

impl FileStore {
    /// Open a store, loading existing preferences if the file exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                Error::preferences(format!("Failed to read preferences file: {e}"))
            })?;
            match serde_json::from_str(&contents) {
                Ok(JsonValue::Object(map)) => map,
                Ok(_) => {
                    return Err(Error::preferences(
                        "Preferences file must contain a JSON object",
                    ))
                }
                Err(e) => {
                    return Err(Error::preferences(format!(
                        "Failed to parse preferences file: {e}"
                    )))
                }
            }
        } else {
            JsonObject::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Get the preferences file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &JsonObject) -> Result<()> {
        let contents = serde_json::to_string_pretty(values)
            .map_err(|e| Error::preferences(format!("Failed to serialize preferences: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::preferences(format!("Failed to create preferences directory: {e}"))
                })?;
            }
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, contents)
            .map_err(|e| Error::preferences(format!("Failed to write preferences file: {e}")))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::preferences(format!("Failed to rename preferences file: {e}")))?;

        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get_object(&self, key: &str) -> Result<Option<JsonValue>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set_object(&self, key: &str, value: JsonValue) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        // Only commit what reached the disk
        self.save(&updated)?;
        *values = updated;
        Ok(())
    }
}
