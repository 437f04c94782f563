//! Local key/value storage backed by a single JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{AuthError, AuthResult};

/// File name used inside the data directory
const STORAGE_FILE: &str = "storage.json";

/// Persistent string key/value store
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Store backed by an explicit file
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `storage.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value; a missing file reads as empty
    pub fn get_item(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> AuthResult<()> {
        let mut items = self.read_all().unwrap_or_else(|e| {
            tracing::warn!(path = ?self.path, "Discarding unreadable local storage: {}", e);
            BTreeMap::new()
        });
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> AuthResult<()> {
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(AuthError::Corrupt(_)) => return self.write_all(&BTreeMap::new()),
            Err(e) => return Err(e),
        };
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn read_all(&self) -> AuthResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file via a temp file and rename
    fn write_all(&self, items: &BTreeMap<String, String>) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
