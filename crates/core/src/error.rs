//! Error types shared by every stage of the extraction pipeline.

use std::collections::TryReserveError;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a single pipeline stage.
///
/// Every variant is fatal to the run; no stage retries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// File-system failure (open, read, seek, write, mkdir, unlink).
    #[error("I/O error while trying to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table or slice array could not grow.
    #[error("Memory allocation failed while building {what}: {source}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// The sample is not a well-formed PE file.
    #[error("Invalid PE file: {0}")]
    Format(String),

    /// No strategy of the requested kind is registered under `name`.
    #[error("Unknown {kind} strategy '{name}' (available: {})", available.join(", "))]
    UnknownStrategy { kind: StrategyKind, name: String, available: Vec<String> },

    /// Engine or report settings are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { op, path: path.into(), source }
    }

    pub fn alloc(what: &'static str, source: TryReserveError) -> Self {
        Self::Allocation { what, source }
    }
}

impl From<goblin::error::Error> for EngineError {
    fn from(err: goblin::error::Error) -> Self {
        Self::Format(err.to_string())
    }
}

/// Which registry a strategy name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Region,
    Model,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Region => f.write_str("region"),
            StrategyKind::Model => f.write_str("model"),
        }
    }
}

/// Pipeline stage names, used to tell the user where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Metadata,
    Entropy,
    Region,
    NGram,
    Model,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Metadata => "metadata",
            Stage::Entropy => "entropy",
            Stage::Region => "region",
            Stage::NGram => "ngram",
            Stage::Model => "model",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// An [`EngineError`] tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: EngineError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: EngineError) -> Self {
        Self { stage, source }
    }
}

/// Extension used by the pipeline to tag stage results.
pub(crate) trait StageResultExt<T> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, PipelineError>;
}

impl<T> StageResultExt<T> for std::result::Result<T, EngineError> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, PipelineError> {
        self.map_err(|source| PipelineError::new(stage, source))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_strategy_lists_available_names() {
        let err = EngineError::UnknownStrategy {
            kind: StrategyKind::Model,
            name: "bogus".into(),
            available: vec!["descending-frequency".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown model strategy 'bogus' (available: descending-frequency)"
        );
    }

    #[test]
    fn pipeline_error_names_the_stage() {
        let err = PipelineError::new(Stage::Metadata, EngineError::Format("bad MZ".into()));
        assert_eq!(err.to_string(), "metadata stage failed: Invalid PE file: bad MZ");
    }

    #[test]
    fn at_stage_tags_errors_and_passes_values_through() {
        let ok: Result<u8> = Ok(7);
        assert_eq!(ok.at_stage(Stage::NGram).unwrap(), 7);

        let failed: Result<u8> = Err(EngineError::InvalidConfig("ring too small".into()));
        let err = failed.at_stage(Stage::NGram).unwrap_err();
        assert_eq!(err.stage, Stage::NGram);
        assert!(matches!(err.source, EngineError::InvalidConfig(_)));
    }
}
