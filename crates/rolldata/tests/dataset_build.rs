mod common;

use std::sync::Arc;

use common::{endless, garbage, piano_and_bass, piano_only};
use pretty_assertions::assert_eq;
use rolldata::{
    CollectingObserver, DatasetBuilder, Error, Instrument, LoadWarning, MidiDataset,
    PITCH_COUNT,
};
use tempfile::TempDir;

#[test]
fn oversized_file_is_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    let good = piano_only(dir.path(), "good.mid", 2);
    let huge = endless(dir.path(), "huge.mid");

    let observer = Arc::new(CollectingObserver::new());
    let dataset = DatasetBuilder::new(vec![Instrument::Piano])
        .observer(observer.clone())
        .build(&[&good, &huge])
        .unwrap();

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records()[0].path(), Some(good.as_path()));
    assert!(matches!(
        observer.warnings().as_slice(),
        [LoadWarning::SkippedFile { path, .. }] if path == &huge
    ));
}

#[test]
fn unparsable_files_are_skipped_and_order_is_kept() {
    let dir = TempDir::new().unwrap();
    let a = piano_and_bass(dir.path(), "a.mid");
    let b = piano_only(dir.path(), "b.mid", 1);
    let c = garbage(dir.path(), "c.mid");

    let observer = Arc::new(CollectingObserver::new());
    let dataset = DatasetBuilder::new(vec![Instrument::Piano])
        .observer(observer.clone())
        .build(&[&a, &b, &c])
        .unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[0].path(), Some(a.as_path()));
    assert_eq!(dataset.records()[1].path(), Some(b.as_path()));

    assert_eq!(dataset.get(0).unwrap().dim(), (96, PITCH_COUNT, 1));
    assert_eq!(dataset.get(1).unwrap().dim(), (24, PITCH_COUNT, 1));

    let warnings = observer.warnings();
    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        LoadWarning::SkippedFile { path, .. } => assert_eq!(path, &c),
        other => panic!("expected skipped file, got {other:?}"),
    }
}

#[test]
fn build_with_defaults() {
    let dir = TempDir::new().unwrap();
    let a = piano_and_bass(dir.path(), "a.mid");
    let b = piano_only(dir.path(), "b.mid", 3);
    let c = garbage(dir.path(), "c.mid");

    let dataset = MidiDataset::build(&[a, b, c], &[Instrument::Piano], None).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.required(), &[Instrument::Piano]);
    assert_eq!(dataset.get(1).unwrap().dim(), (72, PITCH_COUNT, 1));
}

#[test]
fn stacked_values_match_pianorolls() {
    let dir = TempDir::new().unwrap();
    let a = piano_and_bass(dir.path(), "a.mid");

    let dataset =
        MidiDataset::build(&[a], &[Instrument::Bass, Instrument::Piano], None).unwrap();
    let item = dataset.get(0).unwrap();

    assert_eq!(item.dim(), (96, PITCH_COUNT, 2));
    // channel 0 is bass, channel 1 is piano
    assert_eq!(item[[0, 36, 0]], 110);
    assert_eq!(item[[95, 36, 0]], 110);
    assert_eq!(item[[0, 60, 1]], 100);
    assert_eq!(item[[30, 64, 1]], 90);
    assert_eq!(item[[60, 64, 1]], 0);
}

#[test]
fn missing_required_instrument_fails_the_build() {
    let dir = TempDir::new().unwrap();
    let a = piano_only(dir.path(), "a.mid", 1);
    let b = piano_only(dir.path(), "b.mid", 2);

    let result = MidiDataset::build(&[a.clone(), b], &[Instrument::Reed], None);
    match result {
        Err(Error::Validation {
            instrument,
            index,
            path,
        }) => {
            assert_eq!(instrument, Instrument::Reed);
            assert_eq!(index, 0);
            assert_eq!(path, Some(a));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn validation_error_names_the_instrument() {
    let dir = TempDir::new().unwrap();
    let a = piano_only(dir.path(), "a.mid", 1);

    let err = MidiDataset::build(&[a], &[Instrument::Piano, Instrument::Reed], None).unwrap_err();
    assert!(err.to_string().contains("REED"), "{err}");
}

#[test]
fn nonexistent_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let a = piano_only(dir.path(), "a.mid", 1);
    let missing = dir.path().join("missing.mid");

    let observer = Arc::new(CollectingObserver::new());
    let dataset = DatasetBuilder::new(vec![Instrument::Piano])
        .observer(observer.clone())
        .build(&[missing, a])
        .unwrap();

    assert_eq!(dataset.len(), 1);
    assert_eq!(observer.warnings().len(), 1);
}

#[test]
fn all_files_bad_gives_empty_dataset() {
    let dir = TempDir::new().unwrap();
    let c = garbage(dir.path(), "c.mid");

    let dataset = MidiDataset::build(&[c], &[Instrument::Piano], None).unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn parallel_load_preserves_path_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<_> = (1..=12)
        .map(|beats| piano_only(dir.path(), &format!("{beats:02}.mid"), beats))
        .collect();

    let dataset = DatasetBuilder::new(vec![Instrument::Piano])
        .workers(4)
        .build(&paths)
        .unwrap();

    let steps: Vec<usize> = dataset
        .iter()
        .map(|item| item.unwrap().dim().0)
        .collect();
    assert_eq!(steps, (1..=12).map(|beats| beats * 24).collect::<Vec<usize>>());
    for (record, path) in dataset.records().iter().zip(&paths) {
        assert_eq!(record.path(), Some(path.as_path()));
    }
}

#[test]
fn duplicate_instruments_are_reported_once_per_file() {
    let dir = TempDir::new().unwrap();
    let dup = common::write_midi(
        dir.path(),
        "dup.mid",
        &[
            (0, vec![common::note(0, 480, 60, 100)]),
            (4, vec![common::note(0, 480, 72, 50)]),
        ],
    );

    let observer = Arc::new(CollectingObserver::new());
    let dataset = DatasetBuilder::new(vec![Instrument::Piano])
        .observer(observer.clone())
        .build(&[dup])
        .unwrap();

    let item = dataset.get(0).unwrap();
    assert_eq!(item[[0, 60, 0]], 100);
    assert_eq!(item[[0, 72, 0]], 0);
    assert!(matches!(
        observer.warnings().as_slice(),
        [LoadWarning::DuplicateInstrument {
            instrument: Instrument::Piano,
            program: 4,
            ..
        }]
    ));
}
