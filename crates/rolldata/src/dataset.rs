//! Indexable multi-instrument pianoroll datasets.

use std::path::Path;
use std::sync::Arc;

use midi_roll::{MidiParser, TrackParser, PITCH_COUNT};
use ndarray::{Array3, ArrayView2, Axis};
use rayon::prelude::*;

use crate::cache::PianorollCache;
use crate::config::DatasetConfig;
use crate::instrument::Instrument;
use crate::observer::{LoadObserver, LoadWarning, TracingObserver};
use crate::record::MidiRecord;

/// An ordered collection of records that all contain the required instruments.
///
/// Item `i` is a `(T_i, 128, K)` tensor: the required instruments' pianorolls
/// stacked on a trailing axis, in the order they were required. `T_i` varies
/// by record.
#[derive(Debug, Clone)]
pub struct MidiDataset {
    records: Vec<MidiRecord>,
    required: Vec<Instrument>,
}

impl MidiDataset {
    /// Load `paths` with the default parser, skipping unparsable files.
    ///
    /// `cache_root` of `None` disables the pianoroll cache.
    pub fn build<P: AsRef<Path> + Sync>(
        paths: &[P],
        required: &[Instrument],
        cache_root: Option<&Path>,
    ) -> crate::Result<Self> {
        DatasetBuilder::new(required.to_vec())
            .cache(PianorollCache::from_root(cache_root))
            .build(paths)
    }

    /// Wrap records that were already loaded. Validates like [`MidiDataset::build`].
    pub fn from_records(records: Vec<MidiRecord>, required: Vec<Instrument>) -> crate::Result<Self> {
        let dataset = Self { records, required };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Every record must hold every required instrument. Fails on the first gap.
    fn validate(&self) -> crate::Result<()> {
        for (index, record) in self.records.iter().enumerate() {
            for &instrument in &self.required {
                if !record.contains(instrument) {
                    return Err(crate::Error::Validation {
                        instrument,
                        index,
                        path: record.path().map(Path::to_path_buf),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn required(&self) -> &[Instrument] {
        &self.required
    }

    pub fn records(&self) -> &[MidiRecord] {
        &self.records
    }

    /// The `(T, 128, K)` tensor for record `index`.
    pub fn get(&self, index: usize) -> crate::Result<Array3<u8>> {
        let record = self
            .records
            .get(index)
            .ok_or(crate::Error::IndexOutOfRange {
                index,
                len: self.records.len(),
            })?;

        if self.required.is_empty() {
            return Ok(Array3::zeros((record.steps(), PITCH_COUNT, 0)));
        }

        let views = self
            .required
            .iter()
            .map(|&instrument| record.pianoroll(instrument).map(|roll| roll.view()))
            .collect::<crate::Result<Vec<ArrayView2<'_, u8>>>>()?;

        let expected = views[0].nrows();
        for (view, &instrument) in views.iter().zip(&self.required) {
            if view.nrows() != expected {
                return Err(crate::Error::ShapeMismatch {
                    index,
                    instrument,
                    expected,
                    found: view.nrows(),
                });
            }
        }

        Ok(ndarray::stack(Axis(2), &views)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = crate::Result<Array3<u8>>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }
}

/// Configures how a [`MidiDataset`] is loaded.
#[derive(Clone)]
pub struct DatasetBuilder {
    required: Vec<Instrument>,
    cache: Arc<PianorollCache>,
    parser: Arc<dyn TrackParser>,
    observer: Arc<dyn LoadObserver>,
    workers: usize,
}

impl DatasetBuilder {
    /// Defaults: no cache, midly parser, warnings to `tracing`, one worker.
    pub fn new(required: Vec<Instrument>) -> Self {
        Self {
            required,
            cache: Arc::new(PianorollCache::disabled()),
            parser: Arc::new(MidiParser::default()),
            observer: Arc::new(TracingObserver),
            workers: 1,
        }
    }

    pub fn from_config(config: &DatasetConfig) -> Self {
        let cache = match &config.cache {
            Some(cache) => PianorollCache::from_config(cache.clone()),
            None => PianorollCache::disabled(),
        };
        Self::new(config.required.clone())
            .cache(cache)
            .parser(MidiParser::new(config.parse.clone()))
            .workers(config.workers)
    }

    pub fn cache(mut self, cache: PianorollCache) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    pub fn parser(mut self, parser: impl TrackParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Number of files loaded concurrently. 0 and 1 both mean sequential.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Load every path, drop the ones that fail to parse, then validate.
    ///
    /// Record order always follows `paths`, whatever the worker count.
    pub fn build<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> crate::Result<MidiDataset> {
        let loaded: Vec<Option<MidiRecord>> = if self.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()
                .map_err(|e| crate::Error::Pool(e.to_string()))?;
            pool.install(|| {
                paths
                    .par_iter()
                    .map(|path| self.load_one(path.as_ref()))
                    .collect::<crate::Result<Vec<_>>>()
            })?
        } else {
            paths
                .iter()
                .map(|path| self.load_one(path.as_ref()))
                .collect::<crate::Result<Vec<_>>>()?
        };

        let records: Vec<MidiRecord> = loaded.into_iter().flatten().collect();
        tracing::info!(
            requested = paths.len(),
            loaded = records.len(),
            "loaded MIDI records"
        );

        MidiDataset::from_records(records, self.required.clone())
    }

    /// A parse failure becomes a warning and `None`; anything else is fatal.
    fn load_one(&self, path: &Path) -> crate::Result<Option<MidiRecord>> {
        match MidiRecord::from_path(path, &self.cache, self.parser.as_ref(), self.observer.as_ref())
        {
            Ok(record) => {
                self.observer.loaded(path, record.source());
                Ok(Some(record))
            }
            Err(crate::Error::Parse { path, source }) => {
                self.observer.warn(&LoadWarning::SkippedFile {
                    path,
                    reason: source.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for DatasetBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetBuilder")
            .field("required", &self.required)
            .field("cache", &self.cache)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}
