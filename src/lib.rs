pub mod config;
pub mod core;
pub mod events;
pub mod export_cmd;
pub mod storage;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read event log {}: {reason}", path.display())]
    LogRead { path: PathBuf, reason: String },
    #[error("no scalar summaries found in event log")]
    NoScalarTags,
    #[error("scalar series '{tag}' has {len} samples, row {row} is out of range")]
    MisalignedSeries { tag: String, row: usize, len: usize },
    #[error("scalar series '{tag}' has {len} samples, expected {expected}")]
    LengthMismatch { tag: String, len: usize, expected: usize },
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl ExportError {
    pub(crate) fn log_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ExportError::LogRead { path: path.into(), reason: reason.into() }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Machine-readable summary of one export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub timestamp: String,
    pub logdir: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub scalar_tags: Vec<String>,
    /// Number of tags per summary kind, keyed by kind name.
    pub tag_counts: BTreeMap<String, usize>,
    pub load_time_ms: u128,
    pub export_time_ms: u128,
}

// Shared helpers
pub fn now_string() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".to_string())
}
