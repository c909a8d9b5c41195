use std::collections::BTreeMap;
use std::path::Path;

use midi_roll::{Pianoroll, Track, PITCH_COUNT};

use crate::instrument::{map_program, Instrument};
use crate::observer::{LoadObserver, LoadWarning};

/// One pianoroll per instrument family, ordered by enumeration order.
pub type PianorollMap = BTreeMap<Instrument, Pianoroll>;

/// Bucket parsed tracks into one pianoroll per instrument family.
///
/// Tracks are visited in order. When a second track maps to a family that
/// already has a pianoroll, the first is kept and the observer receives a
/// [`LoadWarning::DuplicateInstrument`]. Matrices are moved in unchanged;
/// families may differ in length.
///
/// `source` only labels warnings.
pub fn extract(
    tracks: Vec<Track>,
    source: Option<&Path>,
    observer: &dyn LoadObserver,
) -> crate::Result<PianorollMap> {
    let mut pianorolls = PianorollMap::new();

    for (track_index, track) in tracks.into_iter().enumerate() {
        let instrument = map_program(track.program)?;

        let width = track.pianoroll.ncols();
        if width != PITCH_COUNT {
            return Err(crate::Error::PitchAxis { track_index, width });
        }

        if pianorolls.contains_key(&instrument) {
            observer.warn(&LoadWarning::DuplicateInstrument {
                path: source.map(Path::to_path_buf),
                instrument,
                program: track.program,
                track_index,
            });
            continue;
        }

        pianorolls.insert(instrument, track.pianoroll);
    }

    Ok(pianorolls)
}
