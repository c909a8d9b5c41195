//! Multi-instrument pianoroll datasets for sequence models.
//!
//! Each MIDI file becomes a [`MidiRecord`]: one `(time, 128)` pianoroll per
//! [`Instrument`] family found in it. A [`MidiDataset`] loads many files,
//! drops the ones that fail to parse, insists that every survivor holds the
//! required instruments, and serves `(time, 128, K)` tensors by index.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use rolldata::{Instrument, MidiDataset};
//!
//! let paths = vec!["data/midis/a.mid", "data/midis/b.mid"];
//! let dataset = MidiDataset::build(
//!     &paths,
//!     &[Instrument::Piano],
//!     Some(Path::new("cache/midis")),
//! )?;
//!
//! for item in dataset.iter() {
//!     let tensor = item?;
//!     println!("{:?}", tensor.dim());
//! }
//! # Ok::<(), rolldata::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod instrument;
pub mod observer;
pub mod record;

pub use cache::PianorollCache;
pub use config::DatasetConfig;
pub use dataset::{DatasetBuilder, MidiDataset};
pub use error::{Error, Result};
pub use extract::{extract, PianorollMap};
pub use instrument::{map_program, Instrument, ParseInstrumentError};
pub use observer::{CollectingObserver, LoadObserver, LoadWarning, NullObserver, TracingObserver};
pub use record::{MidiRecord, RecordSource};

pub use midi_roll::{Pianoroll, Track, TrackParser, PITCH_COUNT};
