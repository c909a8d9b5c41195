//! Entry storage backends, addressed by [`PathKey`].
//!
//! Layout of [`FileStore`]:
//! ```text
//! {root}/
//! ├── 3f9a...e1.roll            # one entry per source path
//! ├── 8c02...7d.roll
//! └── .8c02...7d.<uuid>.tmp     # in-flight write, renamed over the entry
//! ```

use std::fs;
use std::io;
use std::path::PathBuf;

use dashmap::DashMap;
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::key::PathKey;

/// File extension of cache entries.
pub const ENTRY_EXTENSION: &str = "roll";

/// Trait for entry storage backends.
///
/// Stores raw bytes; encoding is handled by [`crate::PathCache`].
pub trait EntryStore: Send + Sync {
    /// Returns `Ok(None)` if no entry exists for the key.
    fn load(&self, key: &PathKey) -> Result<Option<Vec<u8>>>;

    /// Write an entry, replacing any existing one.
    fn save(&self, key: &PathKey, bytes: &[u8]) -> Result<()>;

    /// Delete an entry. Returns whether one existed.
    fn remove(&self, key: &PathKey) -> Result<bool>;

    fn exists(&self, key: &PathKey) -> bool;

    /// Get the filesystem path for an entry (if available).
    ///
    /// Returns `None` for non-file backends or if the entry doesn't exist.
    fn location(&self, key: &PathKey) -> Option<PathBuf>;

    fn is_read_only(&self) -> bool {
        false
    }
}

/// Filesystem store: one flat `{key}.roll` file per entry.
#[derive(Debug, Clone)]
pub struct FileStore {
    config: CacheConfig,
}

impl FileStore {
    /// Create a FileStore. No directories are touched until the first write.
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn at_root(path: impl Into<PathBuf>) -> Self {
        Self::new(CacheConfig::with_root(path))
    }

    pub fn read_only_at(path: impl Into<PathBuf>) -> Self {
        Self::new(CacheConfig::read_only(path))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the path where an entry would be stored.
    pub fn entry_path(&self, key: &PathKey) -> PathBuf {
        self.config
            .root
            .join(format!("{}.{}", key.as_str(), ENTRY_EXTENSION))
    }

    /// Create the cache root and any missing parents.
    ///
    /// Safe to call repeatedly and from concurrent loaders: a directory
    /// created by someone else in the meantime is not an error.
    pub fn ensure_root(&self) -> Result<()> {
        match fs::create_dir_all(&self.config.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.config.root.is_dir() => {
                Ok(())
            }
            Err(source) => Err(CacheError::Io {
                path: self.config.root.clone(),
                source,
            }),
        }
    }
}

impl EntryStore for FileStore {
    fn load(&self, key: &PathKey) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(key);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn save(&self, key: &PathKey, bytes: &[u8]) -> Result<()> {
        if self.config.read_only {
            return Err(CacheError::ReadOnly);
        }

        self.ensure_root()?;

        // Write beside the target, then rename: readers see the old entry or the new one
        let target = self.entry_path(key);
        let temp = self
            .config
            .root
            .join(format!(".{}.{}.tmp", key.as_str(), Uuid::new_v4().simple()));

        fs::write(&temp, bytes).map_err(|source| CacheError::Io {
            path: temp.clone(),
            source,
        })?;

        if let Err(source) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(CacheError::Io {
                path: target,
                source,
            });
        }

        Ok(())
    }

    fn remove(&self, key: &PathKey) -> Result<bool> {
        if self.config.read_only {
            return Err(CacheError::ReadOnly);
        }

        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn exists(&self, key: &PathKey) -> bool {
        self.entry_path(key).is_file()
    }

    fn location(&self, key: &PathKey) -> Option<PathBuf> {
        let path = self.entry_path(key);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    fn is_read_only(&self) -> bool {
        self.config.read_only
    }
}

/// In-memory store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<PathKey, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntryStore for MemoryStore {
    fn load(&self, key: &PathKey) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn save(&self, key: &PathKey, bytes: &[u8]) -> Result<()> {
        self.entries.insert(key.clone(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &PathKey) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn exists(&self, key: &PathKey) -> bool {
        self.entries.contains_key(key)
    }

    fn location(&self, _key: &PathKey) -> Option<PathBuf> {
        None
    }
}
