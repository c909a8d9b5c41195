//! The 16 coarse instrument families of General MIDI.
//!
//! Program numbers 0..=127 fall into 16 contiguous blocks of 8; each block is
//! one family. Declaration order is significant: it drives sorting and the
//! channel order of stacked tensors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instrument {
    Piano,
    ChromaticPercussion,
    Organ,
    Guitar,
    Bass,
    Strings,
    Ensemble,
    Brass,
    Reed,
    Pipe,
    SynthLead,
    SynthPad,
    SynthEffects,
    Ethnic,
    Percussive,
    SoundEffects,
}

/// Highest valid General MIDI program number.
pub const MAX_PROGRAM: u8 = 127;

const PROGRAMS_PER_FAMILY: u8 = 8;

impl Instrument {
    /// Every family, in enumeration order.
    pub const ALL: [Instrument; 16] = [
        Instrument::Piano,
        Instrument::ChromaticPercussion,
        Instrument::Organ,
        Instrument::Guitar,
        Instrument::Bass,
        Instrument::Strings,
        Instrument::Ensemble,
        Instrument::Brass,
        Instrument::Reed,
        Instrument::Pipe,
        Instrument::SynthLead,
        Instrument::SynthPad,
        Instrument::SynthEffects,
        Instrument::Ethnic,
        Instrument::Percussive,
        Instrument::SoundEffects,
    ];

    /// 1-based position in the enumeration (PIANO = 1).
    pub fn ordinal(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        ordinal
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "PIANO",
            Instrument::ChromaticPercussion => "CHROMATIC_PERCUSSION",
            Instrument::Organ => "ORGAN",
            Instrument::Guitar => "GUITAR",
            Instrument::Bass => "BASS",
            Instrument::Strings => "STRINGS",
            Instrument::Ensemble => "ENSEMBLE",
            Instrument::Brass => "BRASS",
            Instrument::Reed => "REED",
            Instrument::Pipe => "PIPE",
            Instrument::SynthLead => "SYNTH_LEAD",
            Instrument::SynthPad => "SYNTH_PAD",
            Instrument::SynthEffects => "SYNTH_EFFECTS",
            Instrument::Ethnic => "ETHNIC",
            Instrument::Percussive => "PERCUSSIVE",
            Instrument::SoundEffects => "SOUND_EFFECTS",
        }
    }
}

/// Bucket a General MIDI program number into its family.
///
/// Total over 0..=127. Anything above 127 is not a program a parser can
/// legally produce and is rejected rather than wrapped.
pub fn map_program(program: u8) -> crate::Result<Instrument> {
    if program > MAX_PROGRAM {
        return Err(crate::Error::ProgramOutOfRange(program));
    }
    Ok(Instrument::ALL[(program / PROGRAMS_PER_FAMILY) as usize])
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown instrument: {0}")]
pub struct ParseInstrumentError(pub String);

impl FromStr for Instrument {
    type Err = ParseInstrumentError;

    /// Accepts the upper-case name in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|instrument| instrument.name() == normalized)
            .ok_or_else(|| ParseInstrumentError(s.to_string()))
    }
}
