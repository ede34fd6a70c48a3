use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

pub const STORE_FILE_NAME: &str = "local_store.json";
const TMP_SUFFIX: &str = "tmp";

/// JSON object on disk used as a small key-value store.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so readers never observe a half-written file.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Opens (or prepares) the store file inside `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self::at(dir.join(STORE_FILE_NAME)))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_all()?.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value);
        self.write_all(&map)?;
        debug!(key, path = %self.path.display(), "local store updated");
        Ok(())
    }

    /// Read-modify-write of one key under the write lock. Returning `None`
    /// from `edit` removes the key. Yields whatever `edit` reports.
    pub fn update<T, R, F>(&self, key: &str, edit: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> (Option<T>, R),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_all()?;
        let current = match map.remove(key) {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };
        let existed = current.is_some();
        let (next, report) = edit(current);
        match next {
            Some(value) => {
                map.insert(key.to_string(), serde_json::to_value(&value)?);
            }
            None if !existed => return Ok(report),
            None => {}
        }
        self.write_all(&map)?;
        debug!(key, path = %self.path.display(), "local store updated");
        Ok(report)
    }

    /// Returns whether the key existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_all()?;
        let existed = map.remove(key).is_some();
        if existed {
            self.write_all(&map)?;
        }
        Ok(existed)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read_all()?.keys().cloned().collect())
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&data)? {
            Value::Object(map) => Ok(map),
            _ => Err(StorageError::Corrupt(self.path.display().to_string())),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension(TMP_SUFFIX);
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn set_get_remove_roundtrip() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.get::<Vec<String>>("guestSavedDeals").unwrap(), None);

        store.set("guestSavedDeals", &vec!["d1", "d2"]).unwrap();
        store.set("theme", "dark").unwrap();
        let saved: Vec<String> = store.get("guestSavedDeals").unwrap().unwrap();
        assert_eq!(saved, vec!["d1".to_string(), "d2".to_string()]);

        let reopened = LocalStore::open(dir.path()).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["guestSavedDeals", "theme"]);
        assert!(reopened.remove("theme").unwrap());
        assert!(!reopened.remove("theme").unwrap());
        assert!(!dir.path().join("local_store.tmp").exists());
    }

    #[test]
    fn update_edits_in_place_and_removes_on_none() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set("theme", "dark").unwrap();

        let len = store
            .update("ids", |ids: Option<Vec<String>>| {
                let mut ids = ids.unwrap_or_default();
                ids.push("d1".into());
                let len = ids.len();
                (Some(ids), len)
            })
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(store.get::<Vec<String>>("ids").unwrap(), Some(vec!["d1".to_string()]));

        store.update("ids", |_: Option<Vec<String>>| (None, ())).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["theme"]);
    }

    #[test]
    fn non_object_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "[1,2,3]").unwrap();
        let store = LocalStore::at(path);
        assert!(matches!(store.keys(), Err(StorageError::Corrupt(_))));
    }
}
