use std::path::{Path, PathBuf};

use midi_roll::{Pianoroll, PITCH_COUNT};
use rollcache::{CacheConfig, PathCache};
use serde::{Deserialize, Serialize};

use crate::extract::PianorollMap;
use crate::instrument::Instrument;

/// Serialized form: a length-prefixed list of (ordinal, matrix) pairs.
#[derive(Serialize)]
struct StoredRollRef<'a> {
    ordinal: u8,
    pianoroll: &'a Pianoroll,
}

#[derive(Deserialize)]
struct StoredRoll {
    ordinal: u8,
    pianoroll: Pianoroll,
}

/// Optional pianoroll cache. Disabled means every lookup misses and every
/// write is dropped.
#[derive(Debug, Default)]
pub struct PianorollCache {
    inner: Option<PathCache>,
}

impl PianorollCache {
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Some(PathCache::at_root(root)),
        }
    }

    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            inner: Some(PathCache::new(config)),
        }
    }

    /// `None` disables caching.
    pub fn from_root(root: Option<&Path>) -> Self {
        root.map(Self::at).unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn path_cache(&self) -> Option<&PathCache> {
        self.inner.as_ref()
    }

    /// The stored map for `path`, or `None` when disabled or absent.
    ///
    /// An entry that exists but does not decode to a valid map is an error.
    pub fn get(&self, path: &Path) -> crate::Result<Option<PianorollMap>> {
        let Some(cache) = &self.inner else {
            return Ok(None);
        };
        let Some(stored) = cache.get::<Vec<StoredRoll>>(path)? else {
            return Ok(None);
        };

        let mut map = PianorollMap::new();
        for roll in stored {
            let instrument = Instrument::from_ordinal(roll.ordinal).ok_or_else(|| {
                crate::Error::CorruptEntry {
                    path: path.to_path_buf(),
                    reason: format!("unknown instrument ordinal {}", roll.ordinal),
                }
            })?;
            if roll.pianoroll.ncols() != PITCH_COUNT {
                return Err(crate::Error::CorruptEntry {
                    path: path.to_path_buf(),
                    reason: format!(
                        "{instrument} has a pitch axis of {}",
                        roll.pianoroll.ncols()
                    ),
                });
            }
            if map.insert(instrument, roll.pianoroll).is_some() {
                return Err(crate::Error::CorruptEntry {
                    path: path.to_path_buf(),
                    reason: format!("{instrument} stored twice"),
                });
            }
        }
        Ok(Some(map))
    }

    /// Store `map` for `path`. No-op when disabled or read-only.
    pub fn put(&self, path: &Path, map: &PianorollMap) -> crate::Result<()> {
        let Some(cache) = &self.inner else {
            return Ok(());
        };
        if cache.is_read_only() {
            tracing::debug!(path = %path.display(), "read-only cache, not storing");
            return Ok(());
        }

        let stored: Vec<StoredRollRef<'_>> = map
            .iter()
            .map(|(instrument, pianoroll)| StoredRollRef {
                ordinal: instrument.ordinal(),
                pianoroll,
            })
            .collect();
        cache.put(path, &stored)?;
        Ok(())
    }
}
