use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

use crate::models::user::UserRecord;
use crate::utils::error::AppResult;

// Everything the storefront keeps between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    // Email of the signed-in user, if any
    #[serde(default)]
    pub session: Option<String>,
}

impl StoreData {
    pub fn find_user(&self, email: &str) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.email == email)
    }

    pub fn find_user_mut(&mut self, email: &str) -> Option<&mut UserRecord> {
        self.users.iter_mut().find(|user| user.email == email)
    }
}

/// Persistence seam for user records and the session marker.
///
/// Implementations load and save the whole document; there is one writer at a
/// time, so there is no merging or conflict detection.
pub trait StorageBackend {
    fn load(&self) -> AppResult<StoreData>;
    fn save(&mut self, data: &StoreData) -> AppResult<()>;
}

// In-memory backend. Clones share the same document, so a test can keep a handle to inspect writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Rc<RefCell<StoreData>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn snapshot(&self) -> StoreData {
        self.data.borrow().clone()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> AppResult<StoreData> {
        Ok(self.data.borrow().clone())
    }

    fn save(&mut self, data: &StoreData) -> AppResult<()> {
        *self.data.borrow_mut() = data.clone();
        Ok(())
    }
}

// JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }
}

impl StorageBackend for JsonFileStorage {
    fn load(&self) -> AppResult<StoreData> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "profile store missing, starting empty");
            return Ok(StoreData::default());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(StoreData::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&mut self, data: &StoreData) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write next to the target and rename so a crash never leaves half a document
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(data)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), users = data.users.len(), "profile store saved");
        Ok(())
    }
}
