use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::ExportResult;
use crate::core::SizeGuidance;
use crate::events::AccumulatorOptions;
use crate::storage::AlignmentPolicy;

pub const DEFAULT_OUTPUT: &str = "metrics.csv";

/// Settings for one export run, optionally read from a TOML file.
///
/// ```toml
/// output = "runs/metrics.csv"
/// alignment = "strict"
/// purge_orphaned = true
///
/// [size_guidance]
/// scalars = 0
/// images = 4
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub output: PathBuf,
    pub alignment: AlignmentPolicy,
    pub purge_orphaned: bool,
    pub size_guidance: SizeGuidance,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            output: PathBuf::from(DEFAULT_OUTPUT),
            alignment: AlignmentPolicy::FirstTag,
            purge_orphaned: true,
            size_guidance: SizeGuidance::default(),
        }
    }
}

impl ExportConfig {
    pub fn accumulator_options(&self) -> AccumulatorOptions {
        AccumulatorOptions { size_guidance: self.size_guidance, purge_orphaned: self.purge_orphaned }
    }
}

pub fn load_export_config(path: &Path) -> ExportResult<ExportConfig> {
    let s = std::fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: ExportConfig = toml::from_str(&s).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
