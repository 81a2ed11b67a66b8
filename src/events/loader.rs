//! Loads a log directory (or a single event file) into a `TagIndex`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use super::accumulator::{AccumulatorOptions, EventAccumulator};
use super::record::RecordReader;
use crate::core::{SizeGuidance, TagIndex};
use crate::{ExportError, ExportResult};

/// Marker that identifies event files inside a log directory.
pub const EVENT_FILE_MARKER: &str = "tfevents";

/// Load every event file under `path` with the given retention caps.
///
/// Orphaned data from restarted runs is purged.
pub fn load(path: &Path, size_guidance: &SizeGuidance) -> ExportResult<TagIndex> {
    load_with_options(path, AccumulatorOptions { size_guidance: *size_guidance, purge_orphaned: true })
}

pub fn load_with_options(path: &Path, options: AccumulatorOptions) -> ExportResult<TagIndex> {
    let start = Instant::now();
    let files = event_files(path)?;

    let mut acc = EventAccumulator::new(options);
    for file in &files {
        debug!(path = %file.display(), "reading event file");
        acc.ingest(RecordReader::open(file)?)?;
    }

    let index = acc.into_index();
    info!(
        logdir = %path.display(),
        files = files.len(),
        scalar_tags = index.scalar_tags().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded event log"
    );
    Ok(index)
}

/// Event files to read for `path`, in reading order.
///
/// A file path is returned as is. For a directory, the regular files whose
/// name contains `tfevents` are returned sorted by name; subdirectories are
/// not descended into.
pub fn event_files(path: &Path) -> ExportResult<Vec<PathBuf>> {
    let meta = std::fs::metadata(path).map_err(|e| ExportError::log_read(path, e.to_string()))?;
    if meta.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path).map_err(|e| ExportError::log_read(path, format!("failed to list directory: {e}")))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExportError::log_read(path, format!("failed to list directory: {e}")))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && entry.file_name().to_string_lossy().contains(EVENT_FILE_MARKER) {
            files.push(entry.path());
        }
    }
    if files.is_empty() {
        return Err(ExportError::log_read(path, "no event files found"));
    }
    files.sort();
    Ok(files)
}
