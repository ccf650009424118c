//! Sequencing of the extraction stages.
//!
//! Metadata -> entropy -> region -> n-gram -> model -> report. Each stage
//! finishes before the next starts and the first failure ends the run.

use std::path::Path;

use serde::Serialize;
use tracing::{info, info_span};

use crate::analysis::{profile_sections, NGramCollector};
use crate::config::EngineConfig;
use crate::error::{PipelineError, Result, Stage, StageResultExt};
use crate::model::{EntropyProfile, Model, RegionSet, SectionDescriptor};
use crate::pe::PeSample;
use crate::report::{sample_name, ReportPaths, ReportSink};
use crate::services::builders::{default_model_registry, ModelRegistry};
use crate::services::regions::{default_region_registry, RegionRegistry};

/// Sections of a sample and their entropy profiles, index-aligned.
#[derive(Debug, Clone, Serialize)]
pub struct SampleProfile {
    pub sample: String,
    pub sections: Vec<SectionDescriptor>,
    pub profiles: Vec<Option<EntropyProfile>>,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub sample: String,
    pub sections: Vec<SectionDescriptor>,
    #[serde(skip)]
    pub profiles: Vec<Option<EntropyProfile>>,
    pub regions: RegionSet,
    /// Distinct non-dummy tokens observed.
    pub distinct_tokens: usize,
    /// Sum of all token frequencies.
    pub total_tokens: u64,
    #[serde(skip)]
    pub model: Model,
    pub slices: usize,
    pub reports: ReportPaths,
}

/// The feature-extraction engine with its strategy registries.
pub struct Engine {
    config: EngineConfig,
    regions: RegionRegistry,
    models: ModelRegistry,
}

impl Engine {
    /// Engine using the built-in strategies.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let models = default_model_registry(config.truncate_below);
        Self::with_registries(config, default_region_registry(), models)
    }

    pub fn with_registries(
        config: EngineConfig,
        regions: RegionRegistry,
        models: ModelRegistry,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, regions, models })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn region_registry(&self) -> &RegionRegistry {
        &self.regions
    }

    pub fn model_registry(&self) -> &ModelRegistry {
        &self.models
    }

    /// Run every stage on `input` and hand the results to `sink`.
    pub fn run(&self, input: &Path, sink: &ReportSink) -> std::result::Result<RunOutcome, PipelineError> {
        let selector = self.regions.resolve(&self.config.region_strategy).at_stage(Stage::Region)?;
        let builder = self.models.resolve(&self.config.model_strategy).at_stage(Stage::Model)?;

        let sample = sample_name(input);
        let span = info_span!("run", sample = %sample, dimension = %self.config.dimension);
        let _enter = span.enter();

        let mut pe = PeSample::open(input).at_stage(Stage::Metadata)?;
        info!(sections = pe.sections().len(), "metadata decoded");

        let sections = pe.sections().to_vec();
        let (path, file) = pe.source();
        let profiles = profile_sections(file, path, &sections).at_stage(Stage::Entropy)?;
        info!(profiled = profiles.iter().flatten().count(), "entropy profiled");

        let regions = selector.select(&sections, &profiles).at_stage(Stage::Region)?;
        info!(
            strategy = selector.name(),
            regions = regions.regions.len(),
            ranges = regions.total_ranges(),
            "regions selected"
        );

        let mut collector = NGramCollector::new(self.config.dimension, self.config.ring_capacity)
            .at_stage(Stage::NGram)?;
        let tokens = collector.collect(file, path, &sections, &regions).at_stage(Stage::NGram)?;
        info!(distinct = tokens.len(), total = tokens.total(), "n-grams collected");

        let model =
            builder.build(&tokens, self.config.dimension.max_value()).at_stage(Stage::Model)?;
        info!(strategy = builder.name(), slices = model.len(), "model built");

        sink.prepare().at_stage(Stage::Report)?;
        let reports = sink.emit(&sections, &profiles, &model).at_stage(Stage::Report)?;
        info!(out_dir = %sink.layout().out_dir.display(), "reports written");

        Ok(RunOutcome {
            sample,
            sections,
            profiles,
            regions,
            distinct_tokens: tokens.len(),
            total_tokens: tokens.total(),
            slices: model.len(),
            model,
            reports,
        })
    }
}

/// Decode the section table and profile every section, without selecting or collecting.
pub fn profile_sample(input: &Path) -> std::result::Result<SampleProfile, PipelineError> {
    let mut pe = PeSample::open(input).at_stage(Stage::Metadata)?;
    let sections = pe.sections().to_vec();
    let (path, file) = pe.source();
    let profiles = profile_sections(file, path, &sections).at_stage(Stage::Entropy)?;
    Ok(SampleProfile { sample: sample_name(input), sections, profiles })
}
