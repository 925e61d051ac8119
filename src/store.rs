//! Where transferred files live.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

/// A flat mapping from file name to file content, shared by every session.
///
/// Reads take a snapshot of the whole file; writes replace it whole.
pub trait Store: Send + Sync {
    /// Returns the content stored under `name`, if any.
    fn get(&self, name: &str) -> Option<Arc<[u8]>>;

    /// Stores `content` under `name`, replacing anything already there.
    fn put(&self, name: &str, content: Vec<u8>);

    /// Whether anything is stored under `name`.
    fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// A [`Store`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with every regular file directly inside `dir`,
    /// keyed by file name.
    ///
    /// Subdirectories and files whose names are not UTF-8 are skipped.
    /// Nothing is ever written back to `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let store = Self::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    warn!(?name, "skipping file with non-UTF-8 name");
                    continue;
                }
            };

            let content = fs::read(entry.path())?;
            debug!(%name, len = content.len(), "preloaded");
            store.put(&name, content);
        }

        Ok(store)
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files().len()
    }

    /// Whether the store holds no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn files(&self) -> MutexGuard<'_, HashMap<String, Arc<[u8]>>> {
        // Every critical section is a single map operation, so a poisoned
        // map is still consistent.
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn get(&self, name: &str) -> Option<Arc<[u8]>> {
        self.files().get(name).cloned()
    }

    fn put(&self, name: &str, content: Vec<u8>) {
        self.files().insert(name.to_string(), content.into());
    }
}
