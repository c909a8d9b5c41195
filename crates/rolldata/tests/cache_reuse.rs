mod common;

use std::sync::Arc;

use common::{piano_and_bass, piano_only};
use pretty_assertions::assert_eq;
use rolldata::{
    CollectingObserver, DatasetBuilder, Error, Instrument, MidiDataset, MidiRecord,
    PianorollCache, RecordSource,
};
use tempfile::TempDir;

#[test]
fn second_build_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let a = piano_and_bass(dir.path(), "a.mid");
    let b = piano_only(dir.path(), "b.mid", 2);

    let first_observer = Arc::new(CollectingObserver::new());
    let first = DatasetBuilder::new(vec![Instrument::Piano])
        .cache(PianorollCache::at(cache_dir.path()))
        .observer(first_observer.clone())
        .build(&[&a, &b])
        .unwrap();

    let second_observer = Arc::new(CollectingObserver::new());
    let second = DatasetBuilder::new(vec![Instrument::Piano])
        .cache(PianorollCache::at(cache_dir.path()))
        .observer(second_observer.clone())
        .build(&[&a, &b])
        .unwrap();

    let sources = |observer: &CollectingObserver| -> Vec<RecordSource> {
        observer.loaded_files().into_iter().map(|(_, source)| source).collect()
    };
    assert_eq!(sources(&first_observer), vec![RecordSource::Parsed; 2]);
    assert_eq!(sources(&second_observer), vec![RecordSource::Cache; 2]);

    for index in 0..first.len() {
        assert_eq!(first.get(index).unwrap(), second.get(index).unwrap());
    }
}

#[test]
fn cache_hit_survives_source_deletion() {
    let dir = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let a = piano_and_bass(dir.path(), "a.mid");
    let cache = PianorollCache::at(cache_dir.path());

    let parsed = MidiRecord::open(&a, &cache).unwrap();
    std::fs::remove_file(&a).unwrap();
    let cached = MidiRecord::open(&a, &cache).unwrap();

    assert_eq!(cached.source(), RecordSource::Cache);
    assert_eq!(cached.instruments(), vec![Instrument::Piano, Instrument::Bass]);
    assert_eq!(parsed.pianorolls(), cached.pianorolls());
}

#[test]
fn cache_is_keyed_by_path_not_content() {
    let dir = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let a = piano_only(dir.path(), "a.mid", 1);
    let cache = PianorollCache::at(cache_dir.path());

    MidiRecord::open(&a, &cache).unwrap();

    // Rewrite the file in place; the stale entry is still served
    piano_and_bass(dir.path(), "a.mid");
    let record = MidiRecord::open(&a, &cache).unwrap();
    assert_eq!(record.source(), RecordSource::Cache);
    assert_eq!(record.instruments(), vec![Instrument::Piano]);

    // Removing the entry forces a re-parse
    assert!(cache.path_cache().unwrap().remove(&a).unwrap());
    let record = MidiRecord::open(&a, &cache).unwrap();
    assert_eq!(record.source(), RecordSource::Parsed);
    assert_eq!(record.instruments(), vec![Instrument::Piano, Instrument::Bass]);
}

#[test]
fn corrupt_entry_aborts_the_build() {
    let dir = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let a = piano_only(dir.path(), "a.mid", 1);
    let b = piano_only(dir.path(), "b.mid", 1);

    MidiDataset::build(&[&a, &b], &[Instrument::Piano], Some(cache_dir.path())).unwrap();

    let cache = PianorollCache::at(cache_dir.path());
    let location = cache.path_cache().unwrap().location(&b).unwrap();
    std::fs::write(location, b"not an entry").unwrap();

    let result = MidiDataset::build(&[&a, &b], &[Instrument::Piano], Some(cache_dir.path()));
    assert!(matches!(result, Err(Error::Cache(_))), "{result:?}");
}

#[test]
fn parallel_build_fills_cache() {
    let dir = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let paths: Vec<_> = (1..=8)
        .map(|beats| piano_only(dir.path(), &format!("{beats}.mid"), beats))
        .collect();

    // Repeated paths write the same key from several workers
    let mut doubled = paths.clone();
    doubled.extend(paths.iter().cloned());

    let dataset = DatasetBuilder::new(vec![Instrument::Piano])
        .cache(PianorollCache::at(cache_dir.path()))
        .workers(4)
        .build(&doubled)
        .unwrap();
    assert_eq!(dataset.len(), 16);

    let entries = std::fs::read_dir(cache_dir.path()).unwrap().count();
    assert_eq!(entries, 8);
}
