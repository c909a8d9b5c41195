use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use rolldata::{LoadObserver, LoadWarning, RecordSource};

/// Drives a progress bar from load events and prints warnings above it.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} Loading MIDI files [{bar:40.green/dim}] {pos}/{len} {msg:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░ "),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl LoadObserver for ProgressObserver {
    fn warn(&self, warning: &LoadWarning) {
        self.bar.println(format!("⚠ {warning}"));
        if matches!(warning, LoadWarning::SkippedFile { .. }) {
            self.bar.inc(1);
        }
    }

    fn loaded(&self, path: &Path, source: RecordSource) {
        if let Some(name) = path.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
        if source == RecordSource::Cache {
            tracing::trace!(path = %path.display(), "cache hit");
        }
        self.bar.inc(1);
    }
}
