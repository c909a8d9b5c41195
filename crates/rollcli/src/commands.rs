use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use midi_roll::ParseOptions;
use rollcache::{CacheConfig, PathCache, PathKey};
use rolldata::{
    extract, map_program, DatasetBuilder, DatasetConfig, Instrument, RecordSource,
    TracingObserver,
};

use crate::discover;
use crate::progress::ProgressObserver;

#[derive(clap::Args)]
pub struct LoadArgs {
    /// MIDI files, or directories searched recursively for *.mid / *.midi
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Required instruments, in tensor channel order (e.g., PIANO,BASS)
    #[arg(short, long, value_delimiter = ',')]
    pub required: Vec<Instrument>,

    /// Dataset config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cache directory (overrides the config file and ROLLBOOK_CACHE_PATH)
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Skip the pianoroll cache entirely
    #[arg(long)]
    pub no_cache: bool,

    /// Files loaded concurrently
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Time steps per quarter note
    #[arg(long)]
    pub steps_per_beat: Option<u32>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// Flags win over the config file, which wins over the environment.
///
/// `--cache` only replaces the root; ROLLBOOK_CACHE_READONLY still applies.
pub(crate) fn resolve_config(args: &LoadArgs) -> Result<DatasetConfig> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_file(path)?,
        None => DatasetConfig::default(),
    };

    if !args.required.is_empty() {
        config.required = args.required.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(steps_per_beat) = args.steps_per_beat {
        config.parse.steps_per_beat = steps_per_beat;
    }

    config.cache = if args.no_cache {
        None
    } else if let Some(root) = &args.cache {
        Some(CacheConfig {
            root: root.clone(),
            read_only: CacheConfig::from_env()?.read_only,
        })
    } else {
        match config.cache.take() {
            Some(cache) => Some(cache),
            None => Some(CacheConfig::from_env()?),
        }
    };

    Ok(config)
}

fn cache_root(cache: Option<PathBuf>) -> Result<PathBuf> {
    match cache {
        Some(root) => Ok(root),
        None => Ok(CacheConfig::from_env()?.root),
    }
}

pub fn load(args: LoadArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let files = discover::midi_files(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("no MIDI files found");
    }

    match &config.cache {
        Some(cache) => tracing::info!(root = %cache.root.display(), "using pianoroll cache"),
        None => tracing::info!("pianoroll cache disabled"),
    }

    let mut builder = DatasetBuilder::from_config(&config);
    let progress = if args.quiet {
        None
    } else {
        let observer = Arc::new(ProgressObserver::new(files.len()));
        builder = builder.observer(observer.clone());
        Some(observer)
    };

    let built = builder.build(&files);
    if let Some(progress) = &progress {
        progress.finish();
    }
    let dataset = built.context("failed to build dataset")?;

    let cached = dataset
        .records()
        .iter()
        .filter(|record| record.source() == RecordSource::Cache)
        .count();
    let names: Vec<&str> = dataset.required().iter().map(|i| i.name()).collect();

    println!("Dataset: {} of {} files", dataset.len(), files.len());
    println!("  required: [{}]", names.join(", "));
    println!("  from cache: {cached}, parsed: {}", dataset.len() - cached);

    for (index, record) in dataset.records().iter().enumerate() {
        let (steps, pitches, channels) = dataset.get(index)?.dim();
        let path = record
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!("  [{index:>4}] ({steps}, {pitches}, {channels}) {path}");
    }

    Ok(())
}

pub fn inspect(file: &Path, steps_per_beat: u32) -> Result<()> {
    let options = ParseOptions {
        steps_per_beat,
        ..ParseOptions::default()
    };
    let tracks = midi_roll::parse_file(file, &options)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    println!("{}: {} tracks", file.display(), tracks.len());
    for (index, track) in tracks.iter().enumerate() {
        let family = map_program(track.program)?;
        println!(
            "  track {index}: program {:>3} {:<16} steps {} active {}{}{}",
            track.program,
            family.name(),
            track.steps(),
            track.active_cells(),
            if track.is_drum { " drums" } else { "" },
            track
                .name
                .as_deref()
                .map(|n| format!(" \"{n}\""))
                .unwrap_or_default(),
        );
    }

    let pianorolls = extract(tracks, Some(file), &TracingObserver)?;
    let kept: Vec<&str> = pianorolls.keys().map(|i| i.name()).collect();
    println!("Instruments: [{}]", kept.join(", "));

    Ok(())
}

pub fn key(path: &Path, cache: Option<PathBuf>) -> Result<()> {
    let cache = PathCache::at_root(cache_root(cache)?);
    for line in describe_key(&cache, path) {
        println!("{line}");
    }
    Ok(())
}

/// The key for `path`, then where its entry lives and whether it exists.
fn describe_key(cache: &PathCache, path: &Path) -> [String; 2] {
    let key: PathKey = cache.key(path);
    let location = cache.store().entry_path(&key);
    let state = if cache.contains(path) { "present" } else { "absent" };
    [key.to_string(), format!("{} ({state})", location.display())]
}

pub fn evict(paths: &[PathBuf], cache: Option<PathBuf>) -> Result<()> {
    let store = PathCache::at_root(cache_root(cache)?);

    let mut removed = 0;
    for path in paths {
        if store.remove(path)? {
            removed += 1;
            tracing::debug!(path = %path.display(), "evicted");
        } else {
            println!("not cached: {}", path.display());
        }
    }
    println!("Removed {removed} of {} entries", paths.len());

    Ok(())
}
