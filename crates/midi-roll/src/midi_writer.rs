//! Standard MIDI File output for synthetic fixtures.

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};

const DRUM_CHANNEL: u8 = 9;
const MICROS_PER_BEAT: u32 = 500_000;
const MAX_DELTA: u64 = (1 << 28) - 1;

/// A note to be written, in absolute ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteNote {
    pub onset_tick: u64,
    pub offset_tick: u64,
    pub pitch: u8,
    pub velocity: u8,
}

/// One output track: a program and the notes it plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteTrack {
    pub program: u8,
    /// Explicit channel; `None` takes the next free melodic channel.
    pub channel: Option<u8>,
    pub name: Option<String>,
    pub notes: Vec<WriteNote>,
}

impl WriteTrack {
    pub fn new(program: u8, notes: Vec<WriteNote>) -> Self {
        Self {
            program,
            channel: None,
            name: None,
            notes,
        }
    }
}

/// Hands out channels 0..=15 in order, never the percussion channel.
struct ChannelAllocator {
    next: u8,
}

impl ChannelAllocator {
    fn take(&mut self) -> u8 {
        if self.next == DRUM_CHANNEL {
            self.next += 1;
        }
        let channel = self.next.min(15);
        self.next = self.next.saturating_add(1);
        channel
    }
}

/// Encode `tracks` as a format 1 file at `ppq` ticks per quarter note.
///
/// Track 0 carries the tempo map (120 BPM, 4/4); each input becomes one
/// further track with an optional name, a program change and its notes.
pub fn notes_to_midi(tracks: &[WriteTrack], ppq: u16) -> crate::Result<Vec<u8>> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(ppq)),
    ));
    smf.tracks.push(tempo_track());

    let mut channels = ChannelAllocator { next: 0 };
    for track in tracks {
        let channel = match track.channel {
            Some(channel) => channel.min(15),
            None => channels.take(),
        };
        smf.tracks.push(note_track(track, u4::new(channel))?);
    }

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)
        .map_err(|e| crate::Error::MidiWrite(e.to_string()))?;
    Ok(bytes)
}

fn tempo_track() -> Vec<TrackEvent<'static>> {
    [
        MetaMessage::Tempo(u24::new(MICROS_PER_BEAT)),
        MetaMessage::TimeSignature(4, 2, 24, 8),
        MetaMessage::EndOfTrack,
    ]
    .into_iter()
    .map(|meta| TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(meta),
    })
    .collect()
}

fn note_track(track: &WriteTrack, channel: u4) -> crate::Result<Vec<TrackEvent<'_>>> {
    // (tick, note-offs sort first, event)
    let mut timed: Vec<(u64, u8, TrackEventKind<'_>)> = Vec::new();

    if let Some(name) = &track.name {
        timed.push((0, 0, TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes()))));
    }
    timed.push((
        0,
        0,
        TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(track.program & 0x7F),
            },
        },
    ));

    for note in &track.notes {
        let key = u7::new(note.pitch & 0x7F);
        timed.push((
            note.onset_tick,
            1,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity & 0x7F),
                },
            },
        ));
        timed.push((
            note.offset_tick,
            0,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        ));
    }

    timed.sort_by_key(|(tick, order, _)| (*tick, *order));

    let mut events = Vec::with_capacity(timed.len() + 1);
    let mut last_tick = 0u64;
    for (tick, _, kind) in timed {
        let delta = tick - last_tick;
        if delta > MAX_DELTA {
            return Err(crate::Error::MidiWrite(format!(
                "gap of {delta} ticks does not fit a delta time"
            )));
        }
        events.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind,
        });
        last_tick = tick;
    }
    events.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(onset_tick: u64, offset_tick: u64, pitch: u8) -> WriteNote {
        WriteNote {
            onset_tick,
            offset_tick,
            pitch,
            velocity: 100,
        }
    }

    fn first_channel(track: &[TrackEvent<'_>]) -> Option<u8> {
        track.iter().find_map(|event| match event.kind {
            TrackEventKind::Midi { channel, .. } => Some(channel.as_int()),
            _ => None,
        })
    }

    #[test]
    fn writes_tempo_track_plus_one_per_input() {
        let bytes = notes_to_midi(&[WriteTrack::new(0, vec![note(0, 480, 60)])], 480).unwrap();

        let smf = Smf::parse(&bytes).expect("written file should parse");
        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.tracks.len(), 2);
        assert!(smf.tracks[0].iter().any(|event| matches!(
            event.kind,
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) if tempo.as_int() == MICROS_PER_BEAT
        )));
    }

    #[test]
    fn program_change_is_written() {
        let bytes = notes_to_midi(&[WriteTrack::new(40, vec![note(0, 480, 60)])], 480).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let program = smf.tracks[1].iter().find_map(|event| match event.kind {
            TrackEventKind::Midi {
                message: MidiMessage::ProgramChange { program },
                ..
            } => Some(program.as_int()),
            _ => None,
        });
        assert_eq!(program, Some(40));
    }

    #[test]
    fn auto_channels_skip_percussion() {
        let tracks: Vec<WriteTrack> = (0..11).map(|_| WriteTrack::new(0, vec![])).collect();
        let bytes = notes_to_midi(&tracks, 480).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let channels: Vec<u8> = smf.tracks[1..]
            .iter()
            .filter_map(|track| first_channel(track))
            .collect();
        assert_eq!(channels, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11]);
    }

    #[test]
    fn explicit_channel_is_kept() {
        let mut drums = WriteTrack::new(0, vec![note(0, 10, 36)]);
        drums.channel = Some(DRUM_CHANNEL);
        let bytes = notes_to_midi(&[drums], 480).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(first_channel(&smf.tracks[1]), Some(DRUM_CHANNEL));
    }

    #[test]
    fn note_off_precedes_note_on_at_same_tick() {
        let track = WriteTrack::new(0, vec![note(0, 480, 60), note(480, 960, 60)]);
        let bytes = notes_to_midi(&[track], 480).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let messages: Vec<&str> = smf.tracks[1]
            .iter()
            .filter_map(|event| match event.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                } => Some("on"),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { .. },
                    ..
                } => Some("off"),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec!["on", "off", "on", "off"]);
    }

    #[test]
    fn oversized_gap_is_rejected() {
        let track = WriteTrack::new(0, vec![note(0, MAX_DELTA + 1, 60)]);
        assert!(matches!(
            notes_to_midi(&[track], 480),
            Err(crate::Error::MidiWrite(_))
        ));
    }
}
