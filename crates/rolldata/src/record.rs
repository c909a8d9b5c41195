use std::path::{Path, PathBuf};

use midi_roll::{MidiParser, Pianoroll, Track, TrackParser};

use crate::cache::PianorollCache;
use crate::extract::{extract, PianorollMap};
use crate::instrument::Instrument;
use crate::observer::{LoadObserver, TracingObserver};

/// Where a record's pianorolls came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Read back from the pianoroll cache; the file was not parsed.
    Cache,
    /// Parsed from the file and written to the cache.
    Parsed,
    /// Built from tracks handed in directly; never cached.
    Tracks,
}

/// The pianorolls of one MIDI file, keyed by instrument family.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiRecord {
    path: Option<PathBuf>,
    pianorolls: PianorollMap,
    source: RecordSource,
}

impl MidiRecord {
    /// Load a file through the cache: a hit skips parsing entirely, a miss
    /// parses, extracts and stores the result before returning.
    pub fn from_path(
        path: &Path,
        cache: &PianorollCache,
        parser: &dyn TrackParser,
        observer: &dyn LoadObserver,
    ) -> crate::Result<Self> {
        if let Some(pianorolls) = cache.get(path)? {
            return Ok(Self {
                path: Some(path.to_path_buf()),
                pianorolls,
                source: RecordSource::Cache,
            });
        }

        let tracks = parser.parse(path).map_err(|source| crate::Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let pianorolls = extract(tracks, Some(path), observer)?;
        cache.put(path, &pianorolls)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            pianorolls,
            source: RecordSource::Parsed,
        })
    }

    /// [`MidiRecord::from_path`] with the default parser, logging warnings via `tracing`.
    pub fn open(path: &Path, cache: &PianorollCache) -> crate::Result<Self> {
        Self::from_path(path, cache, &MidiParser::default(), &TracingObserver)
    }

    /// Build from already-parsed tracks. Bypasses the cache.
    pub fn from_tracks(tracks: Vec<Track>, observer: &dyn LoadObserver) -> crate::Result<Self> {
        Ok(Self {
            path: None,
            pianorolls: extract(tracks, None, observer)?,
            source: RecordSource::Tracks,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> RecordSource {
        self.source
    }

    /// Instruments present, in enumeration order.
    pub fn instruments(&self) -> Vec<Instrument> {
        self.pianorolls.keys().copied().collect()
    }

    pub fn contains(&self, instrument: Instrument) -> bool {
        self.pianorolls.contains_key(&instrument)
    }

    pub fn pianoroll(&self, instrument: Instrument) -> crate::Result<&Pianoroll> {
        self.pianorolls
            .get(&instrument)
            .ok_or(crate::Error::MissingInstrument(instrument))
    }

    pub fn pianorolls(&self) -> &PianorollMap {
        &self.pianorolls
    }

    /// Longest time axis across instruments (0 when empty).
    pub fn steps(&self) -> usize {
        self.pianorolls.values().map(|roll| roll.nrows()).max().unwrap_or(0)
    }
}
