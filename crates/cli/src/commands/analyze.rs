use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use ngram_core::model::{Dimension, RegionSet, Token};
use ngram_core::report::{sample_name, ReportFlags, ReportLayout, ReportPaths, ReportSink};
use ngram_core::{Engine, EngineConfig, ReportConfig};

use crate::commands::util::{hex32, load_run_config, RunConfigFile};
use crate::{canonicalize_or_current, sha256_file};

/// Options for one extraction run, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub input: String,
    pub output: String,
    pub dimension: Option<u8>,
    pub report: Option<String>,
    pub region: Option<String>,
    pub model: Option<String>,
    pub truncate: Option<f64>,
    pub ring_capacity: Option<usize>,
    pub config: Option<String>,
    pub json: bool,
}

/// Summary printed with `--json`.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub sample: String,
    pub input: String,
    pub sha256: String,
    pub analyzed_at: String,
    pub dimension: u8,
    pub region_strategy: String,
    pub model_strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate_below: Option<f64>,
    pub ring_capacity: usize,
    pub sections: usize,
    pub regions: RegionSet,
    pub distinct_tokens: usize,
    pub total_tokens: u64,
    pub slices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<Token>,
    pub reports: ReportPaths,
}

/// Merge the optional config file with explicit flags; flags win.
pub fn resolve_configs(opts: &AnalyzeOptions) -> Result<(EngineConfig, ReportConfig)> {
    let file = match &opts.config {
        Some(path) => load_run_config(&canonicalize_or_current(path)?)?,
        None => RunConfigFile::default(),
    };

    let dimension = match opts.dimension {
        Some(d) => Dimension::new(d).context("Invalid --dimension")?,
        None => file
            .dimension
            .ok_or_else(|| anyhow!("No dimension given (use --dimension or set it in --config)"))?,
    };

    let mut engine = EngineConfig::new(dimension);
    if let Some(name) = opts.region.clone().or(file.region_strategy) {
        engine = engine.with_region_strategy(name);
    }
    if let Some(name) = opts.model.clone().or(file.model_strategy) {
        engine = engine.with_model_strategy(name);
    }
    engine = engine.with_truncation(opts.truncate.or(file.truncate_below));
    if let Some(capacity) = opts.ring_capacity.or(file.ring_capacity) {
        engine = engine.with_ring_capacity(capacity);
    }

    let mut report = file.report.unwrap_or_default();
    if let Some(flags) = &opts.report {
        report.flags = ReportFlags::parse(flags).context("Invalid --report flags")?;
    }
    report.validate().context("Invalid report configuration")?;

    Ok((engine, report))
}

/// Run the full extraction pipeline on one sample.
pub fn analyze_command(opts: &AnalyzeOptions) -> Result<()> {
    let input = canonicalize_or_current(&opts.input)?;
    if !input.is_file() {
        return Err(anyhow!("Input file does not exist: {}", input.display()));
    }
    let out_dir = canonicalize_or_current(&opts.output)?;

    let (engine_config, report_config) = resolve_configs(opts)?;
    debug!(?engine_config, flags = %report_config.flags, out_dir = %out_dir.display(), "resolved run settings");
    let engine = Engine::new(engine_config).context("Invalid engine configuration")?;

    let sample = sample_name(&input);
    let sink = ReportSink::new(ReportLayout::new(&out_dir, &sample), report_config);
    let outcome = engine
        .run(&input, &sink)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;

    let config = engine.config();
    if opts.json {
        let summary = RunSummary {
            sample: outcome.sample.clone(),
            input: input.display().to_string(),
            sha256: sha256_file(&input)?,
            analyzed_at: Utc::now().to_rfc3339(),
            dimension: config.dimension.get(),
            region_strategy: config.region_strategy.clone(),
            model_strategy: config.model_strategy.clone(),
            truncate_below: config.truncate_below,
            ring_capacity: config.ring_capacity,
            sections: outcome.sections.len(),
            regions: outcome.regions.clone(),
            distinct_tokens: outcome.distinct_tokens,
            total_tokens: outcome.total_tokens,
            slices: outcome.slices,
            denominator: outcome.model.denominator,
            reports: outcome.reports.clone(),
        };
        let serialized =
            serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Analyzed sample: {}", outcome.sample);
    println!("  Input: {}", input.display());
    println!("  Dimension: {}", config.dimension);
    println!("  Region strategy: {}", config.region_strategy);
    println!("  Model strategy: {}", config.model_strategy);
    println!("  Sections: {}", outcome.sections.len());
    if outcome.regions.is_empty() {
        println!("  Regions: (none selected)");
    } else {
        println!("  Regions:");
        for region in &outcome.regions.regions {
            let name = outcome.sections.get(region.section).map(|s| s.name.as_str()).unwrap_or("?");
            for range in &region.ranges {
                println!(
                    "    - section #{} {} blocks [{}, {})",
                    region.section,
                    name,
                    range.begin(),
                    range.end()
                );
            }
        }
    }
    println!("  Distinct tokens: {}", outcome.distinct_tokens);
    println!("  Total tokens: {}", outcome.total_tokens);
    println!("  Slices: {}", outcome.slices);
    if let Some(den) = outcome.model.denominator {
        println!("  Denominator: {} ({} hits)", hex32(den.value), den.frequency);
    }
    print_report_path("Entropy report", &outcome.reports.entropy);
    print_report_path("N-gram report", &outcome.reports.ngram);
    print_report_path("Plot script", &outcome.reports.plot_script);
    print_report_path("Image", &outcome.reports.image);

    Ok(())
}

fn print_report_path(label: &str, path: &Option<PathBuf>) {
    if let Some(p) = path {
        println!("  {label}: {}", p.display());
    }
}
