use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::Dimension;
use crate::report::ReportFlags;

/// Default ring buffer capacity in bytes.
pub const DEFAULT_RING_CAPACITY: usize = 4096;

pub const DEFAULT_REGION_STRATEGY: &str = "max-entropy-section";
pub const DEFAULT_MODEL_STRATEGY: &str = "descending-frequency";

/// Settings threaded through every stage of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// N-gram width in bytes.
    pub dimension: Dimension,
    /// Region selector name, resolved against the region registry.
    #[serde(default = "default_region_strategy")]
    pub region_strategy: String,
    /// Model builder name, resolved against the model registry.
    #[serde(default = "default_model_strategy")]
    pub model_strategy: String,
    /// Stop emitting slices once a score falls below this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate_below: Option<f64>,
    /// Ring buffer capacity in bytes; must hold at least two windows.
    #[serde(default = "default_ring_capacity")]
    pub ring_capacity: usize,
}

fn default_region_strategy() -> String {
    DEFAULT_REGION_STRATEGY.to_string()
}

fn default_model_strategy() -> String {
    DEFAULT_MODEL_STRATEGY.to_string()
}

fn default_ring_capacity() -> usize {
    DEFAULT_RING_CAPACITY
}

impl EngineConfig {
    /// Create a configuration using the default strategies for `dimension`.
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            region_strategy: default_region_strategy(),
            model_strategy: default_model_strategy(),
            truncate_below: None,
            ring_capacity: DEFAULT_RING_CAPACITY,
        }
    }

    pub fn with_region_strategy(mut self, name: impl Into<String>) -> Self {
        self.region_strategy = name.into();
        self
    }

    pub fn with_model_strategy(mut self, name: impl Into<String>) -> Self {
        self.model_strategy = name.into();
        self
    }

    pub fn with_truncation(mut self, threshold: Option<f64>) -> Self {
        self.truncate_below = threshold;
        self
    }

    pub fn with_ring_capacity(mut self, capacity: usize) -> Self {
        self.ring_capacity = capacity;
        self
    }

    /// Check the values that the type system does not already guarantee.
    pub fn validate(&self) -> Result<()> {
        let min_capacity = 2 * self.dimension.bytes();
        if self.ring_capacity < min_capacity {
            return Err(EngineError::InvalidConfig(format!(
                "ring capacity must be at least {min_capacity} bytes for dimension {}, got {}",
                self.dimension, self.ring_capacity
            )));
        }
        if let Some(t) = self.truncate_below {
            if !t.is_finite() || t < 0.0 || t > 1.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "truncation threshold must be within [0, 1], got {t}"
                )));
            }
        }
        if self.region_strategy.trim().is_empty() {
            return Err(EngineError::InvalidConfig("region strategy name is empty".into()));
        }
        if self.model_strategy.trim().is_empty() {
            return Err(EngineError::InvalidConfig("model strategy name is empty".into()));
        }
        Ok(())
    }
}

/// Which reports to produce and how to render the plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub flags: ReportFlags,
    /// Plotter executable, looked up on `PATH` when bare.
    #[serde(default = "default_plotter")]
    pub plotter: PathBuf,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
}

/// `GNUPLOT_BIN` if set, otherwise `gnuplot` from `PATH`.
fn default_plotter() -> PathBuf {
    std::env::var_os("GNUPLOT_BIN").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("gnuplot"))
}

fn default_image_width() -> u32 {
    1920
}

fn default_image_height() -> u32 {
    1080
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            flags: ReportFlags::default(),
            plotter: default_plotter(),
            image_width: default_image_width(),
            image_height: default_image_height(),
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        Ok(())
    }
}
