//! Pluggable strategies and the pipeline that sequences them.

pub mod builders;
pub mod pipeline;
pub mod regions;

pub use builders::{default_model_registry, ModelBuilder, ModelRegistry};
pub use pipeline::{Engine, RunOutcome};
pub use regions::{default_region_registry, RegionRegistry, RegionSelector};
