//! Persistence adapter boundary.
//!
//! The core only needs get/set/subscribe semantics over string keys and
//! string values; everything about where the bytes live stays behind the
//! `Storage` trait. `MemoryStorage` stands in for a browser-style shared
//! store (cloned handles behave like tabs over one localStorage), while
//! `FileStorage` keeps the same key/value shape in a single JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

/// Notification that some key of the underlying store was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
}

/// String-keyed storage with change notification.
///
/// Every `set` notifies all subscribers of the same underlying store,
/// including subscribers obtained from the writing handle itself.
#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn subscribe(&self) -> Receiver<StorageChange>;
}

#[derive(Default)]
struct MemoryStorageInner {
    values: BTreeMap<String, String>,
    subscribers: Vec<Sender<StorageChange>>,
}

/// In-memory store shared between cloned handles.
///
/// Two clones of one `MemoryStorage` model two browsing contexts over the
/// same persistent store: a write through either handle is visible to both
/// and delivered to every subscriber.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryStorageInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.values.insert(key.to_string(), value.to_string());

        let change = StorageChange {
            key: key.to_string(),
        };
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StorageChange> {
        let (tx, rx) = mpsc::channel();
        self.inner.lock().unwrap().subscribers.push(tx);
        rx
    }
}

/// File-backed store: one JSON object mapping keys to string values.
///
/// Writes are read-modify-write over the whole file. Change notifications
/// reach in-process subscribers of this instance only; there is no
/// watching of the file itself.
pub struct FileStorage {
    path: PathBuf,
    subscribers: Mutex<Vec<Sender<StorageChange>>>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read storage file {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse storage file {}", self.path.display()))
    }

    fn notify(&self, key: &str) {
        let change = StorageChange {
            key: key.to_string(),
        };
        self.subscribers
            .lock()
            .unwrap()
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // A file that no longer parses is rebuilt from scratch rather than
        // blocking every future write.
        let mut values = self.read_all().unwrap_or_else(|err| {
            log::warn!("rebuilding storage file after read failure: {err:#}");
            BTreeMap::new()
        });
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }

        let data = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write storage file {}", self.path.display()))?;

        self.notify(key);
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StorageChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}
