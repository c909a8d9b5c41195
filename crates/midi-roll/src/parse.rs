use crate::track::{Pianoroll, Track, PITCH_COUNT};
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const DRUM_CHANNEL: u8 = 9;

/// Fallback resolution for SMPTE-timed files.
const DEFAULT_PPQ: u64 = 480;

/// About three hours at 120 BPM and 24 steps per beat.
pub const DEFAULT_MAX_STEPS: usize = 1 << 18;

/// Controls how ticks are quantized onto the pianoroll time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Time steps per quarter note. Default: 24.
    pub steps_per_beat: u32,

    /// Files whose time axis would be longer than this are rejected.
    pub max_steps: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            steps_per_beat: 24,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Source of parsed tracks for a file on disk.
///
/// `rolldata` only talks to this trait, so tests can substitute a parser
/// that fabricates tracks or fails on demand.
pub trait TrackParser: Send + Sync {
    fn parse(&self, path: &Path) -> crate::Result<Vec<Track>>;
}

/// The midly-backed parser.
#[derive(Debug, Clone, Default)]
pub struct MidiParser {
    pub options: ParseOptions,
}

impl MidiParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl TrackParser for MidiParser {
    fn parse(&self, path: &Path) -> crate::Result<Vec<Track>> {
        parse_file(path, &self.options)
    }
}

/// A note with absolute tick timing, before quantization.
#[derive(Debug, Clone, Copy)]
struct RawNote {
    onset_tick: u64,
    offset_tick: u64,
    pitch: u8,
    velocity: u8,
}

/// Notes sharing one (track, channel, program) combination.
#[derive(Debug)]
struct Part {
    track_index: usize,
    channel: u8,
    program: u8,
    name: Option<String>,
    notes: Vec<RawNote>,
}

/// Read and parse a MIDI file from disk.
pub fn parse_file(path: &Path, options: &ParseOptions) -> crate::Result<Vec<Track>> {
    let bytes = std::fs::read(path).map_err(|source| crate::Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&bytes, options)
}

/// Parse MIDI bytes into one pianoroll track per (track, channel, program).
///
/// All returned tracks share the same number of time steps, the step of the
/// last event in the file.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> crate::Result<Vec<Track>> {
    let smf = Smf::parse(bytes).map_err(|e| crate::Error::MidiParse(e.to_string()))?;

    let ppq = match smf.header.timing {
        midly::Timing::Metrical(ticks) if ticks.as_int() > 0 => ticks.as_int() as u64,
        _ => DEFAULT_PPQ,
    };
    let steps_per_beat = options.steps_per_beat.max(1) as u64;

    let (parts, total_ticks) = collect_parts(&smf);

    // Every tick in the file is at most total_ticks, so once the last step
    // is known to fit, the unchecked conversion below cannot overflow.
    let last_step = tick_to_step(total_ticks, steps_per_beat, ppq).ok_or_else(|| {
        crate::Error::MidiParse(format!("tick {total_ticks} overflows the time axis"))
    })?;
    if last_step >= options.max_steps {
        return Err(crate::Error::MidiParse(format!(
            "{} time steps exceeds the limit of {}",
            last_step + 1,
            options.max_steps
        )));
    }
    let to_step = |tick: u64| (tick * steps_per_beat / ppq) as usize;

    let mut steps = to_step(total_ticks);
    for note in parts.iter().flat_map(|p| p.notes.iter()) {
        steps = steps.max(note_end_step(note, &to_step));
    }

    let tracks = parts
        .into_iter()
        .map(|part| {
            let mut pianoroll = Pianoroll::zeros((steps, PITCH_COUNT));
            for note in &part.notes {
                let start = to_step(note.onset_tick);
                let end = note_end_step(note, &to_step);
                let mut column = pianoroll.column_mut(note.pitch as usize);
                for step in start..end {
                    // Overlapping notes keep the louder velocity
                    if column[step] < note.velocity {
                        column[step] = note.velocity;
                    }
                }
            }

            tracing::trace!(
                track = part.track_index,
                channel = part.channel,
                program = part.program,
                notes = part.notes.len(),
                "rasterized part"
            );

            Track {
                program: part.program,
                is_drum: part.channel == DRUM_CHANNEL,
                name: part.name,
                pianoroll,
            }
        })
        .collect();

    Ok(tracks)
}

fn tick_to_step(tick: u64, steps_per_beat: u64, ppq: u64) -> Option<usize> {
    let step = tick.checked_mul(steps_per_beat)? / ppq;
    usize::try_from(step).ok()
}

/// A note always covers at least one step, even when shorter than a step.
fn note_end_step(note: &RawNote, to_step: &impl Fn(u64) -> usize) -> usize {
    to_step(note.offset_tick).max(to_step(note.onset_tick) + 1)
}

/// Pair note-on/note-off events and group the notes into parts.
///
/// Parts are ordered by source track, then by first completed note within it.
fn collect_parts(smf: &Smf) -> (Vec<Part>, u64) {
    let mut parts: Vec<Part> = Vec::new();
    let mut total_ticks: u64 = 0;

    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut current_tick: u64 = 0;
        let mut name = None;
        let mut programs = [0u8; 16];
        // (channel, pitch) -> stack of (onset_tick, velocity, program)
        let mut pending: HashMap<(u8, u8), Vec<(u64, u8, u8)>> = HashMap::new();
        // Part indices for this track, in creation order
        let mut track_parts: Vec<usize> = Vec::new();

        let mut push_note = |parts: &mut Vec<Part>, channel: u8, program: u8, note: RawNote| {
            let existing = track_parts.iter().copied().find(|&i| {
                parts[i].channel == channel && parts[i].program == program
            });
            let index = match existing {
                Some(i) => i,
                None => {
                    parts.push(Part {
                        track_index,
                        channel,
                        program,
                        name: None,
                        notes: Vec::new(),
                    });
                    track_parts.push(parts.len() - 1);
                    parts.len() - 1
                }
            };
            parts[index].notes.push(note);
        };

        for event in track {
            current_tick = current_tick.saturating_add(event.delta.as_int() as u64);

            match event.kind {
                TrackEventKind::Meta(MetaMessage::TrackName(bytes)) => {
                    name = String::from_utf8(bytes.to_vec()).ok();
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch = channel.as_int();
                    match message {
                        MidiMessage::ProgramChange { program } => {
                            programs[ch as usize] = program.as_int();
                        }
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            pending.entry((ch, key.as_int())).or_default().push((
                                current_tick,
                                vel.as_int(),
                                programs[ch as usize],
                            ));
                        }
                        MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                            // vel=0 NoteOn is NoteOff
                            let pitch = key.as_int();
                            if let Some((onset, velocity, program)) =
                                pending.get_mut(&(ch, pitch)).and_then(|stack| stack.pop())
                            {
                                let note = RawNote {
                                    onset_tick: onset,
                                    offset_tick: current_tick,
                                    pitch,
                                    velocity,
                                };
                                push_note(&mut parts, ch, program, note);
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }

            total_ticks = total_ticks.max(current_tick);
        }

        // Close any unclosed notes at the track's final tick
        let mut unclosed: Vec<_> = pending
            .into_iter()
            .flat_map(|((ch, pitch), stack)| {
                stack
                    .into_iter()
                    .map(move |(onset, velocity, program)| (onset, ch, pitch, velocity, program))
            })
            .collect();
        unclosed.sort_unstable();
        for (onset, ch, pitch, velocity, program) in unclosed {
            let note = RawNote {
                onset_tick: onset,
                offset_tick: current_tick,
                pitch,
                velocity,
            };
            push_note(&mut parts, ch, program, note);
        }

        for &i in &track_parts {
            parts[i].name = name.clone();
        }
    }

    (parts, total_ticks)
}
