//! Synthetic MIDI fixtures written to a temp directory.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use midi_roll::{notes_to_midi, WriteNote, WriteTrack};

pub const PPQ: u16 = 480;

/// One quarter note at the default 24 steps per beat.
pub const BEAT: u64 = PPQ as u64;

pub fn note(onset_tick: u64, offset_tick: u64, pitch: u8, velocity: u8) -> WriteNote {
    WriteNote {
        onset_tick,
        offset_tick,
        pitch,
        velocity,
    }
}

/// Write a MIDI file with one track per (program, notes) pair.
pub fn write_midi(dir: &Path, name: &str, parts: &[(u8, Vec<WriteNote>)]) -> PathBuf {
    let tracks: Vec<WriteTrack> = parts
        .iter()
        .map(|(program, notes)| WriteTrack::new(*program, notes.clone()))
        .collect();
    let path = dir.join(name);
    let bytes = notes_to_midi(&tracks, PPQ).expect("encode fixture");
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// Piano (program 0) for two beats and electric bass (program 33) for four.
pub fn piano_and_bass(dir: &Path, name: &str) -> PathBuf {
    write_midi(
        dir,
        name,
        &[
            (0, vec![note(0, BEAT, 60, 100), note(BEAT, 2 * BEAT, 64, 90)]),
            (33, vec![note(0, 4 * BEAT, 36, 110)]),
        ],
    )
}

/// A single piano part lasting `beats` beats.
pub fn piano_only(dir: &Path, name: &str, beats: u64) -> PathBuf {
    write_midi(dir, name, &[(1, vec![note(0, beats * BEAT, 67, 80)])])
}

/// Well-formed, but its single note spans the largest delta time at one tick
/// per beat, far past any sane time axis.
pub fn endless(dir: &Path, name: &str) -> PathBuf {
    let track = WriteTrack::new(0, vec![note(0, (1 << 28) - 1, 60, 100)]);
    let path = dir.join(name);
    let bytes = notes_to_midi(&[track], 1).expect("encode fixture");
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// Bytes no MIDI parser will accept.
pub fn garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"this is not a midi file at all").expect("write fixture");
    path
}
