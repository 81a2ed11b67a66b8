use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::config::{ExportConfig, load_export_config};
use crate::core::TagIndex;
use crate::events::load_with_options;
use crate::storage::{AlignmentPolicy, ScalarTableExporter};
use crate::{ExportError, ExportReport, ExportResult, now_string};

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> ExportResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| ExportError::Message(e.to_string()))?;
        }
    }
    let json = serde_json::to_vec_pretty(value).map_err(|e| ExportError::Message(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| ExportError::Message(e.to_string()))
}

/// Resolve the effective configuration: file values, then command-line overrides.
pub fn resolve_config(config_path: Option<&Path>, output: Option<PathBuf>, strict: bool) -> ExportResult<ExportConfig> {
    let mut cfg = match config_path {
        Some(p) => load_export_config(p)?,
        None => ExportConfig::default(),
    };
    if let Some(output) = output {
        cfg.output = output;
    }
    if strict {
        cfg.alignment = AlignmentPolicy::Strict;
    }
    Ok(cfg)
}

/// Load `logs` and export its scalars to the configured CSV file.
pub fn run(
    logs: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    strict: bool,
    json_out: Option<PathBuf>,
) -> ExportResult<ExportReport> {
    let cfg = resolve_config(config_path.as_deref(), output, strict)?;

    info!("loading event log");
    let start = Instant::now();
    let index = load_with_options(&logs, cfg.accumulator_options())?;
    let load_time_ms = start.elapsed().as_millis();

    info!(output = %cfg.output.display(), alignment = ?cfg.alignment, "exporting scalars");
    let start = Instant::now();
    let rows = ScalarTableExporter::with_policy(cfg.alignment).export(&index, &cfg.output)?;
    let export_time_ms = start.elapsed().as_millis();

    let scalar_tags: Vec<String> = index.scalar_tags().into_iter().map(str::to_string).collect();
    let report = ExportReport {
        timestamp: now_string(),
        logdir: logs,
        output: cfg.output.clone(),
        rows,
        columns: 2 + scalar_tags.len(),
        scalar_tags,
        tag_counts: index.tag_counts(),
        load_time_ms,
        export_time_ms,
    };

    // Output JSON
    if let Some(json_path) = json_out {
        write_json(&json_path, &report)?;
    }

    // Human summary
    println!(
        "export: rows={} columns={} load={}ms export={}ms -> {}",
        report.rows,
        report.columns,
        report.load_time_ms,
        report.export_time_ms,
        report.output.display()
    );

    Ok(report)
}

/// Print how many tags of each kind `logs` holds, without exporting.
pub fn list_tags(logs: PathBuf, config_path: Option<PathBuf>) -> ExportResult<()> {
    let cfg = resolve_config(config_path.as_deref(), None, false)?;
    let index = load_with_options(&logs, cfg.accumulator_options())?;
    print!("{}", tag_summary(&index));
    Ok(())
}

/// One line per summary kind: `<kind>: <n> summaries`, then each tag indented.
pub fn tag_summary(index: &TagIndex) -> String {
    let mut out = String::new();
    for (kind, tags) in index.tags() {
        out.push_str(&format!("{kind}: {} summaries\n", tags.len()));
        for tag in tags {
            out.push_str(&format!("  {tag}\n"));
        }
    }
    out
}
