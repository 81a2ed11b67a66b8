//! CSV export of the scalar series of a `TagIndex`.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ScalarSample, TagIndex};
use crate::{ExportError, ExportResult};

/// Leading columns of every exported table, before one column per scalar tag.
pub const FIXED_HEADERS: &[&str] = &["wall_time", "step"];

/// How scalar series of different lengths are lined up into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentPolicy {
    /// The first tag fixes the row count. Longer tags are cut short, shorter
    /// tags fail at the first missing row.
    #[default]
    FirstTag,
    /// Every tag must have exactly as many samples as the first one.
    Strict,
}

/// Writes one row per sample position of the first scalar tag:
/// `wall_time, step, value_tag_1, ..., value_tag_n`.
///
/// `wall_time` and `step` come from the first tag; the remaining columns hold
/// each tag's value at the same position, in tag discovery order.
#[derive(Debug, Clone, Default)]
pub struct ScalarTableExporter {
    policy: AlignmentPolicy,
}

/// A scalar column: tag name and its samples.
type Column<'a> = (&'a str, &'a [ScalarSample]);

impl ScalarTableExporter {
    /// Create a new exporter with first-tag alignment.
    pub fn new() -> Self {
        ScalarTableExporter::default()
    }

    pub fn with_policy(policy: AlignmentPolicy) -> Self {
        ScalarTableExporter { policy }
    }

    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    /// Export the scalar table to a CSV file, replacing it if it exists.
    ///
    /// The table is written to a temporary file next to `output` and renamed
    /// over it once complete, so a failed export leaves `output` untouched.
    ///
    /// # Errors
    /// `NoScalarTags` when the index holds no scalar tag, `MisalignedSeries` or
    /// `LengthMismatch` when the series cannot be aligned, and `Message` when
    /// file operations or CSV writing fail.
    pub fn export(&self, index: &TagIndex, output: &Path) -> ExportResult<usize> {
        let columns = self.columns(index)?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ExportError::Message(format!("failed to create directory: {e}")))?;
        }

        let mut temp = tempfile::Builder::new()
            .prefix(".tb-export-")
            .suffix(".csv.tmp")
            .tempfile_in(dir)
            .map_err(|e| ExportError::Message(format!("failed to create file: {e}")))?;
        let rows = self.write_table(&columns, &mut temp)?;
        temp.persist(output)
            .map_err(|e| ExportError::Message(format!("failed to replace {}: {}", output.display(), e.error)))?;

        debug!(output = %output.display(), rows, "wrote scalar table");
        Ok(rows)
    }

    /// Export the scalar table to any writer. Returns the number of data rows.
    pub fn export_to_writer<W: Write>(&self, index: &TagIndex, writer: W) -> ExportResult<usize> {
        let columns = self.columns(index)?;
        self.write_table(&columns, writer)
    }

    /// Scalar columns in tag order, validated against the alignment policy.
    fn columns<'a>(&self, index: &'a TagIndex) -> ExportResult<Vec<Column<'a>>> {
        let columns: Vec<Column<'a>> =
            index.scalar_series().iter().map(|(tag, samples)| (tag, samples.as_slice())).collect();
        let Some(&(_, first)) = columns.first() else {
            return Err(ExportError::NoScalarTags);
        };

        if self.policy == AlignmentPolicy::Strict {
            let expected = first.len();
            if let Some(&(tag, samples)) = columns.iter().find(|(_, samples)| samples.len() != expected) {
                return Err(ExportError::LengthMismatch { tag: tag.to_string(), len: samples.len(), expected });
            }
        }
        Ok(columns)
    }

    fn write_table<W: Write>(&self, columns: &[Column<'_>], writer: W) -> ExportResult<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write headers
        csv_writer
            .write_record(header(columns.iter().map(|(tag, _)| *tag)))
            .map_err(|e| ExportError::Message(format!("failed to write CSV headers: {e}")))?;

        let rows = columns.first().map(|(_, samples)| samples.len()).unwrap_or(0);
        for i in 0..rows {
            let row = row_at(columns, i)?;
            csv_writer
                .write_record(&row)
                .map_err(|e| ExportError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| ExportError::Message(format!("failed to flush CSV writer: {e}")))?;

        Ok(rows)
    }
}

/// Header row for the given scalar tags.
pub fn header<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    FIXED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(tags.into_iter().map(str::to_string))
        .collect()
}

/// Row `i`: time and step of the first column's sample, then every column's value.
fn row_at(columns: &[Column<'_>], i: usize) -> ExportResult<Vec<String>> {
    let mut row = Vec::with_capacity(FIXED_HEADERS.len() + columns.len());
    for (n, &(tag, samples)) in columns.iter().enumerate() {
        let sample = samples.get(i).ok_or_else(|| ExportError::MisalignedSeries {
            tag: tag.to_string(),
            row: i,
            len: samples.len(),
        })?;
        if n == 0 {
            row.push(sample.wall_time.to_string());
            row.push(sample.step.to_string());
        }
        row.push(sample.value.to_string());
    }
    Ok(row)
}
