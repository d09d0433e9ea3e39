//! Per-origin key/value storage (the page's localStorage)
//!
//! Values are plain strings with no expiry and no schema version. Two
//! writers sharing one origin overwrite each other; there is no locking
//! across processes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::error::{BridgeError, BridgeResult};

pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> BridgeResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> BridgeResult<()>;
    fn remove_item(&self, key: &str) -> BridgeResult<()>;
}

impl<T: LocalStorage + ?Sized> LocalStorage for std::sync::Arc<T> {
    fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> BridgeResult<()> {
        (**self).remove_item(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> BridgeResult<()> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// One file per key inside an origin directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the origin directory
    pub fn open(dir: impl Into<PathBuf>) -> BridgeResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> BridgeResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(BridgeError::Storage(format!("Invalid key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.value", key)))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(value_len = value.len()))]
    fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("value.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!("Item stored");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> BridgeResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
