//! Core data model shared by the pipeline stages.
//!
//! - Section descriptors and their entropy profiles
//! - Region sets selected for n-gram collection
//! - Tokens, the sparse token table, and the ranked slice model

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Number of raw bytes per entropy block.
pub const BLOCK_SIZE: usize = 256;

/// Number of bytes in a raw PE section name.
pub const SECTION_NAME_LEN: usize = 8;

/// One entry of the PE section table, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub index: usize,
    pub raw_offset: u64,
    pub raw_size: u64,
    pub characteristics: u32,
    /// Printable ASCII name; every other byte is replaced by `_`.
    pub name: String,
}

impl SectionDescriptor {
    /// Number of 256-byte entropy blocks covering the raw data.
    pub fn num_blocks(&self) -> usize {
        self.raw_size.div_ceil(BLOCK_SIZE as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.raw_size == 0
    }
}

/// Replace every byte outside `0x20..=0x7E` with `_`.
pub fn normalize_section_name(raw: &[u8]) -> String {
    raw.iter()
        .take(SECTION_NAME_LEN)
        .map(|&b| if (0x20..=0x7e).contains(&b) { b as char } else { '_' })
        .collect()
}

/// Per-block entropy sequence of one non-empty section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyProfile {
    pub section: usize,
    pub blocks: Vec<f64>,
    pub max: f64,
    pub avg: f64,
    pub min: f64,
}

impl EntropyProfile {
    /// Build a profile from block entropies. Returns `None` for an empty sequence.
    pub fn from_blocks(section: usize, blocks: Vec<f64>) -> Option<Self> {
        if blocks.is_empty() {
            return None;
        }
        let mut max = f64::MIN;
        let mut min = f64::MAX;
        let mut sum = 0.0;
        for &e in &blocks {
            max = max.max(e);
            min = min.min(e);
            sum += e;
        }
        let avg = sum / blocks.len() as f64;
        Some(Self { section, blocks, max, avg, min })
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

/// Half-open block interval `[begin, end)` inside one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeInterval {
    begin: usize,
    end: usize,
}

impl RangeInterval {
    /// Returns `None` unless `end > begin`.
    pub fn new(begin: usize, end: usize) -> Option<Self> {
        (end > begin).then_some(Self { begin, end })
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len_blocks(&self) -> usize {
        self.end - self.begin
    }

    /// Absolute file offset of the first byte, given the owning section.
    pub fn byte_offset(&self, section: &SectionDescriptor) -> u64 {
        section.raw_offset + (self.begin * BLOCK_SIZE) as u64
    }

    pub fn byte_len(&self) -> u64 {
        (self.len_blocks() * BLOCK_SIZE) as u64
    }
}

/// Ranges selected within one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub section: usize,
    pub ranges: Vec<RangeInterval>,
}

/// Full output of a region selector. Empty means there is nothing to analyze.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSet {
    pub regions: Vec<Region>,
}

impl RegionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.iter().all(|r| r.ranges.is_empty())
    }

    pub fn total_ranges(&self) -> usize {
        self.regions.iter().map(|r| r.ranges.len()).sum()
    }
}

/// N-gram width in bytes, always within `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Dimension(u8);

impl Dimension {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidConfig(format!(
                "dimension must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn bytes(self) -> usize {
        self.0 as usize
    }

    pub fn bits(self) -> usize {
        self.bytes() * 8
    }

    /// `256^D`, one past the largest token value.
    pub fn max_value(self) -> u64 {
        1u64 << self.bits()
    }

    /// The all-zero and all-one tokens are padding, never counted.
    pub fn is_dummy(self, value: u64) -> bool {
        value == 0 || value == self.max_value() - 1
    }
}

impl TryFrom<u8> for Dimension {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Dimension> for u8 {
    fn from(d: Dimension) -> u8 {
        d.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A token value and how often it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: u64,
    pub frequency: u64,
}

/// Sparse value -> frequency table. Only observed, non-dummy values are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTable {
    dimension: Dimension,
    counts: HashMap<u64, u64>,
}

impl TokenTable {
    pub fn new(dimension: Dimension) -> Self {
        Self { dimension, counts: HashMap::new() }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Count one occurrence of `value`. Dummy values are ignored.
    pub fn observe(&mut self, value: u64) -> Result<()> {
        if self.dimension.is_dummy(value) {
            return Ok(());
        }
        match self.counts.entry(value) {
            Entry::Occupied(mut slot) => *slot.get_mut() += 1,
            Entry::Vacant(_) => {
                self.counts.try_reserve(1).map_err(|e| EngineError::alloc("token table", e))?;
                self.counts.insert(value, 1);
            }
        }
        Ok(())
    }

    pub fn frequency(&self, value: u64) -> u64 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all frequencies.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Tokens in unspecified order.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.counts.iter().map(|(&value, &frequency)| Token { value, frequency })
    }
}

/// One ranked row of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub denominator: Token,
    pub numerator: Token,
    pub score: f64,
}

/// Ranked, ratio-scored n-gram distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub dimension: Dimension,
    pub max_value: u64,
    /// `None` only when the model is empty.
    pub denominator: Option<Token>,
    pub slices: Vec<Slice>,
}

impl Model {
    pub fn empty(dimension: Dimension) -> Self {
        Self { dimension, max_value: dimension.max_value(), denominator: None, slices: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}
