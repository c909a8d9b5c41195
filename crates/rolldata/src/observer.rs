//! Load observers: where non-fatal warnings and progress go.
//!
//! Components never log warnings through a global; they report to the
//! observer they were handed. [`TracingObserver`] forwards to `tracing`,
//! [`CollectingObserver`] keeps everything for inspection in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::instrument::Instrument;
use crate::record::RecordSource;

/// A recoverable problem met while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A later track mapped to an instrument that already had a pianoroll.
    /// The first one was kept.
    DuplicateInstrument {
        path: Option<PathBuf>,
        instrument: Instrument,
        program: u8,
        track_index: usize,
    },

    /// A file could not be parsed and was left out of the dataset.
    SkippedFile { path: PathBuf, reason: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::DuplicateInstrument {
                path,
                instrument,
                program,
                track_index,
            } => {
                write!(
                    f,
                    "duplicate {instrument} (program {program}) at track {track_index}, keeping the first"
                )?;
                if let Some(path) = path {
                    write!(f, " in {}", path.display())?;
                }
                Ok(())
            }
            LoadWarning::SkippedFile { path, reason } => {
                write!(f, "skipping {}: {reason}", path.display())
            }
        }
    }
}

pub trait LoadObserver: Send + Sync {
    fn warn(&self, warning: &LoadWarning);

    /// A record was produced for `path`.
    fn loaded(&self, _path: &Path, _source: RecordSource) {}
}

/// Forwards warnings to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn warn(&self, warning: &LoadWarning) {
        match warning {
            LoadWarning::DuplicateInstrument {
                instrument,
                program,
                ..
            } => tracing::warn!(%instrument, program, "{}", warning),
            LoadWarning::SkippedFile { path, .. } => {
                tracing::warn!(path = %path.display(), "{}", warning)
            }
        }
    }

    fn loaded(&self, path: &Path, source: RecordSource) {
        tracing::debug!(path = %path.display(), ?source, "loaded record");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl LoadObserver for NullObserver {
    fn warn(&self, _warning: &LoadWarning) {}
}

/// Records warnings and loads in arrival order.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    warnings: Mutex<Vec<LoadWarning>>,
    loaded: Mutex<Vec<(PathBuf, RecordSource)>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<LoadWarning> {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn loaded_files(&self) -> Vec<(PathBuf, RecordSource)> {
        self.loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LoadObserver for CollectingObserver {
    fn warn(&self, warning: &LoadWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(warning.clone());
    }

    fn loaded(&self, path: &Path, source: RecordSource) {
        self.loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((path.to_path_buf(), source));
    }
}
