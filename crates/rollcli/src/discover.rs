use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

fn is_midi(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MIDI_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// Expand each input into MIDI files: files are taken as-is, directories are
/// walked recursively. Directory results are sorted so indices are stable
/// between runs.
pub fn midi_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.with_context(|| format!("failed to walk {}", input.display()))?;
            if entry.file_type().is_file() && is_midi(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        tracing::debug!(dir = %input.display(), count = found.len(), "discovered MIDI files");
        files.extend(found);
    }

    Ok(files)
}
