use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use ngram_core::model::Dimension;
use ngram_core::ReportConfig;

/// On-disk run settings (YAML or JSON). Every field is optional; explicit
/// command-line flags win over values found here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfigFile {
    #[serde(default)]
    pub dimension: Option<Dimension>,
    #[serde(default)]
    pub region_strategy: Option<String>,
    #[serde(default)]
    pub model_strategy: Option<String>,
    #[serde(default)]
    pub truncate_below: Option<f64>,
    #[serde(default)]
    pub ring_capacity: Option<usize>,
    #[serde(default)]
    pub report: Option<ReportConfig>,
}

/// Load a run config file, choosing the parser by extension (`.yaml`, `.yml`, `.json`).
pub fn load_run_config(path: &Path) -> Result<RunConfigFile> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&body)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
        Some("json") => serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
        _ => Err(anyhow!(
            "Unsupported config file extension (expected .yaml, .yml or .json): {}",
            path.display()
        )),
    }
}

/// Format as zero-padded eight-digit hex, matching the text reports.
pub fn hex32(value: u64) -> String {
    format!("0x{:08x}", value)
}
