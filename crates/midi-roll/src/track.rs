use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Width of the pitch axis: every MIDI key 0..=127.
pub const PITCH_COUNT: usize = 128;

/// A `(time, pitch)` matrix of note velocities; 0 is silence.
pub type Pianoroll = Array2<u8>;

/// One parsed instrument part of a MIDI file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// General MIDI program number active when the notes were played.
    pub program: u8,
    /// Notes were played on the percussion channel (channel 10).
    pub is_drum: bool,
    pub name: Option<String>,
    pub pianoroll: Pianoroll,
}

impl Track {
    pub fn new(program: u8, pianoroll: Pianoroll) -> Self {
        Self {
            program,
            is_drum: false,
            name: None,
            pianoroll,
        }
    }

    /// Number of time steps in the pianoroll.
    pub fn steps(&self) -> usize {
        self.pianoroll.nrows()
    }

    /// Number of cells holding a sounding note.
    pub fn active_cells(&self) -> usize {
        self.pianoroll.iter().filter(|&&v| v > 0).count()
    }
}
