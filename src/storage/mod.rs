//! Local key/value persistence
//!
//! [`LocalStore`] is a small string-keyed store on an embedded `sled`
//! database. It holds data that must survive without the backend: locally
//! queued survey responses and the theme preference.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;

use crate::config::Config;
use crate::error::{Result, SurveyflowError};

/// Key of the locally stored survey responses (a JSON array).
pub const RESPONSES_KEY: &str = "surveyflow:responses";

/// Key of the persisted theme preference.
pub const THEME_KEY: &str = "theme-preference";

/// Embedded string-keyed store
pub struct LocalStore {
    db: Db,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("entries", &self.db.len())
            .finish()
    }
}

impl LocalStore {
    /// Open or create a store at `path`
    ///
    /// # Errors
    ///
    /// Returns `SurveyflowError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use surveyflow::storage::LocalStore;
    ///
    /// # fn main() -> surveyflow::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = LocalStore::open(dir.path().join("store"))?;
    /// store.set_item("k", "v")?;
    /// assert_eq!(store.get_item("k")?.as_deref(), Some("v"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SurveyflowError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }
        let db = sled::open(path)
            .map_err(|e| SurveyflowError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!(path = %path.display(), "Opened local store");
        Ok(Self { db })
    }

    /// Open the store in the configured data directory, falling back to the
    /// platform data directory.
    pub fn open_default(config: &Config) -> Result<Self> {
        Self::open(default_store_path(config.storage.data_dir.as_deref())?)
    }

    /// In-memory store discarded on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| SurveyflowError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| SurveyflowError::Storage(format!("Get failed: {}", e)))?;

        match value {
            Some(bytes) => {
                let s = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    SurveyflowError::Storage(format!("Value for '{}' is not UTF-8: {}", key, e))
                })?;
                Ok(Some(s))
            }
            None => Ok(None),
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| SurveyflowError::Storage(format!("Insert failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| SurveyflowError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| SurveyflowError::Storage(format!("Remove failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| SurveyflowError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    /// Reads a JSON array stored under `key`.
    ///
    /// A missing, corrupt or non-array value reads as empty.
    pub fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable local data");
                Ok(Vec::new())
            }
        }
    }

    /// Stores `items` as a JSON array under `key`.
    pub fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.set_item(key, &raw)
    }
}

/// Location of the store: `<data_dir>/store`, where `data_dir` defaults to
/// the platform data directory for SurveyFlow.
pub fn default_store_path(data_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = data_dir {
        return Ok(dir.join("store"));
    }
    let proj_dirs = ProjectDirs::from("com", "surveyflow", "surveyflow")
        .ok_or_else(|| SurveyflowError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("store"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        n: u32,
    }

    #[test]
    fn test_set_get_remove() {
        let store = LocalStore::temporary().unwrap();
        assert_eq!(store.get_item("missing").unwrap(), None);

        store.set_item("theme-preference", "light").unwrap();
        assert_eq!(
            store.get_item("theme-preference").unwrap().as_deref(),
            Some("light")
        );

        store.remove_item("theme-preference").unwrap();
        assert_eq!(store.get_item("theme-preference").unwrap(), None);
    }

    #[test]
    fn test_read_list_missing_is_empty() {
        let store = LocalStore::temporary().unwrap();
        let items: Vec<Entry> = store.read_list(RESPONSES_KEY).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_read_list_corrupt_is_empty() {
        let store = LocalStore::temporary().unwrap();
        store.set_item(RESPONSES_KEY, "{not json").unwrap();
        let items: Vec<Entry> = store.read_list(RESPONSES_KEY).unwrap();
        assert!(items.is_empty());

        store.set_item(RESPONSES_KEY, r#"{"n": 1}"#).unwrap();
        let items: Vec<Entry> = store.read_list(RESPONSES_KEY).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_write_then_read_list() {
        let store = LocalStore::temporary().unwrap();
        store
            .write_list(RESPONSES_KEY, &[Entry { n: 1 }, Entry { n: 2 }])
            .unwrap();
        let items: Vec<Entry> = store.read_list(RESPONSES_KEY).unwrap();
        assert_eq!(items, vec![Entry { n: 1 }, Entry { n: 2 }]);
    }

    #[test]
    fn test_open_persists_across_handles() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("store");
        {
            let store = LocalStore::open(&path).unwrap();
            store.set_item("k", "v").unwrap();
        }
        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_default_store_path_prefers_configured_dir() {
        let path = default_store_path(Some(Path::new("/tmp/sf"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/sf/store"));
    }
}
