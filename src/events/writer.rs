//! Event file writer.
//!
//! Produces event files in the same framing a training process writes. Used to
//! build log directories for tests and demos.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use prost::Message;

use super::proto::{Event, SessionLog, Summary, SummaryPayload, SummaryValue};
use super::record::RecordWriter;
use crate::{ExportError, ExportResult};

pub const FILE_VERSION: &str = "brain.Event:2";

/// File name TensorBoard writers use: `events.out.tfevents.<secs>.<host>`.
pub fn event_file_name(wall_time_secs: u64, host: &str) -> String {
    format!("events.out.tfevents.{wall_time_secs}.{host}")
}

fn now_secs() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

pub struct EventFileWriter {
    path: PathBuf,
    records: RecordWriter<BufWriter<File>>,
}

impl EventFileWriter {
    /// Create `path` and write the `brain.Event:2` version header.
    pub fn create(path: &Path) -> ExportResult<Self> {
        let mut writer = Self::create_raw(path)?;
        writer.write_event(&Event {
            wall_time: now_secs(),
            file_version: FILE_VERSION.to_string(),
            ..Default::default()
        })?;
        Ok(writer)
    }

    /// Create a new event file in `dir` with a writer-style name.
    pub fn create_in(dir: &Path, host: &str) -> ExportResult<Self> {
        Self::create(&dir.join(event_file_name(now_secs() as u64, host)))
    }

    /// Create `path` without a version header (pre-versioned writers).
    pub fn create_raw(path: &Path) -> ExportResult<Self> {
        let file = File::create(path).map_err(|e| ExportError::Message(format!("failed to create file: {e}")))?;
        Ok(EventFileWriter { path: path.to_path_buf(), records: RecordWriter::new(BufWriter::new(file)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_event(&mut self, event: &Event) -> ExportResult<()> {
        self.records
            .write_record(&event.encode_to_vec())
            .map_err(|e| ExportError::Message(format!("failed to write event: {e}")))
    }

    pub fn add_summary(&mut self, tag: &str, payload: SummaryPayload, step: i64, wall_time: f64) -> ExportResult<()> {
        self.write_event(&Event {
            wall_time,
            step,
            summary: Some(Summary {
                value: vec![SummaryValue { tag: tag.to_string(), payload: Some(payload), ..Default::default() }],
            }),
            ..Default::default()
        })
    }

    pub fn add_scalar(&mut self, tag: &str, value: f32, step: i64, wall_time: f64) -> ExportResult<()> {
        self.add_summary(tag, SummaryPayload::SimpleValue(value), step, wall_time)
    }

    /// Several scalars recorded in one event.
    pub fn add_scalars(&mut self, values: &[(&str, f32)], step: i64, wall_time: f64) -> ExportResult<()> {
        let value = values
            .iter()
            .map(|(tag, v)| SummaryValue {
                tag: tag.to_string(),
                payload: Some(SummaryPayload::SimpleValue(*v)),
                ..Default::default()
            })
            .collect();
        self.write_event(&Event { wall_time, step, summary: Some(Summary { value }), ..Default::default() })
    }

    /// Marks a (re)start of the training session at `step`.
    pub fn add_session_start(&mut self, step: i64, wall_time: f64) -> ExportResult<()> {
        self.write_event(&Event {
            wall_time,
            step,
            session_log: Some(SessionLog { status: SessionLog::START, ..Default::default() }),
            ..Default::default()
        })
    }

    pub fn flush(&mut self) -> ExportResult<()> {
        self.records.flush().map_err(|e| ExportError::Message(format!("failed to flush event file: {e}")))
    }
}
