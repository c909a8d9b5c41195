//! Standard MIDI File to pianoroll conversion.
//!
//! Turns a `.mid` file into one [`Track`] per (source track, channel, program)
//! combination, each carrying a `(time, 128)` velocity matrix. This is the
//! parser collaborator consumed by `rolldata`; it does no instrument bucketing.

pub mod midi_writer;
pub mod parse;
pub mod track;

pub use midi_writer::{notes_to_midi, WriteNote, WriteTrack};
pub use parse::{parse_bytes, parse_file, MidiParser, ParseOptions, TrackParser};
pub use track::{Pianoroll, Track, PITCH_COUNT};

use std::path::PathBuf;

/// Errors from MIDI parsing and writing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("MIDI write error: {0}")]
    MidiWrite(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
