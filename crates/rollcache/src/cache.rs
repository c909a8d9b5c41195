//! PathCache: typed get/put of values keyed by source path.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::key::PathKey;
use crate::store::{EntryStore, FileStore};

/// A store plus the entry codec, addressed by source path.
///
/// Writes to the same key are serialized within this process. Nothing guards
/// against other processes sharing the root; the rename in [`FileStore`] keeps
/// readers from seeing half-written entries, and the last writer wins.
pub struct PathCache<S = FileStore> {
    store: S,
    locks: DashMap<PathKey, Arc<Mutex<()>>>,
}

impl PathCache<FileStore> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_store(FileStore::new(config))
    }

    pub fn at_root(path: impl Into<PathBuf>) -> Self {
        Self::new(CacheConfig::with_root(path))
    }

    pub fn config(&self) -> &CacheConfig {
        self.store.config()
    }
}

impl<S: EntryStore> PathCache<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self, path: &Path) -> PathKey {
        PathKey::from_path(path)
    }

    /// Look up the value stored for `path`.
    ///
    /// `Ok(None)` means no entry. An entry that exists but cannot be decoded
    /// is a [`CacheError::Decode`].
    pub fn get<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let key = self.key(path);
        let Some(bytes) = self.store.load(&key)? else {
            tracing::debug!(key = %key, path = %path.display(), "cache miss");
            return Ok(None);
        };

        let value = codec::decode(&bytes).map_err(|source| CacheError::Decode {
            key: key.to_string(),
            source,
        })?;
        tracing::debug!(key = %key, path = %path.display(), "cache hit");
        Ok(Some(value))
    }

    /// Store `value` for `path`, replacing any previous entry.
    pub fn put<T: Serialize>(&self, path: &Path, value: &T) -> Result<PathKey> {
        let key = self.key(path);
        let bytes = codec::encode(value).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;

        let lock = self.locks.entry(key.clone()).or_default().clone();
        let saved = {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            self.store.save(&key, &bytes)
        };
        drop(lock);
        // The map holds the last reference once no other writer is waiting.
        self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        saved?;

        tracing::debug!(key = %key, path = %path.display(), bytes = bytes.len(), "cache write");
        Ok(key)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.store.exists(&self.key(path))
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn remove(&self, path: &Path) -> Result<bool> {
        self.store.remove(&self.key(path))
    }

    /// Filesystem location of the entry for `path`, if it exists on disk.
    pub fn location(&self, path: &Path) -> Option<PathBuf> {
        self.store.location(&self.key(path))
    }

    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for PathCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathCache")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
