//! ngram-core
//!
//! Core library for extracting statistical features from Windows PE files:
//! per-section entropy profiles and bit-granular n-gram distributions.
//!
//! The pipeline is Metadata -> EntropyProfiler -> RegionSelector ->
//! NGramCollector -> ModelBuilder -> Report Sink. Region selectors and model
//! builders are pluggable strategies looked up by name.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends.

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod pe;
pub mod report;
pub mod services;

pub use config::{EngineConfig, ReportConfig};
pub use error::{EngineError, PipelineError, Stage};
pub use services::pipeline::{profile_sample, Engine, RunOutcome, SampleProfile};

/// Crate version baked in at build time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
