use std::path::PathBuf;

use crate::instrument::Instrument;

/// Errors from extraction, caching and dataset assembly.
///
/// Only [`Error::Parse`] is tolerated during a bulk load (the file is skipped);
/// everything else aborts it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: midi_roll::Error,
    },

    #[error(transparent)]
    Cache(#[from] rollcache::CacheError),

    #[error("corrupt cache entry for {path}: {reason}")]
    CorruptEntry { path: PathBuf, reason: String },

    #[error("instrument {instrument} is missing from record {index}{}", describe_path(.path))]
    Validation {
        instrument: Instrument,
        index: usize,
        path: Option<PathBuf>,
    },

    #[error("no pianoroll for instrument {0}")]
    MissingInstrument(Instrument),

    #[error("program {0} is outside the General MIDI range 0..=127")]
    ProgramOutOfRange(u8),

    #[error("track {track_index} has a pitch axis of {width}, expected 128")]
    PitchAxis { track_index: usize, width: usize },

    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("record {index}: {instrument} has {found} steps, expected {expected}")]
    ShapeMismatch {
        index: usize,
        instrument: Instrument,
        expected: usize,
        found: usize,
    },

    #[error("failed to stack pianorolls: {0}")]
    Stack(#[from] ndarray::ShapeError),

    #[error("failed to start loader pool: {0}")]
    Pool(String),
}

fn describe_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" ({})", path.display()),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
