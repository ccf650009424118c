//! Byte-level analysis stages.
//!
//! - Per-block entropy profiling of sections
//! - Bit-granular n-gram collection through a bounded ring buffer

pub mod entropy;
pub mod ngram;
pub mod ring;

pub use entropy::{block_entropy, profile_section, profile_sections};
pub use ngram::NGramCollector;
pub use ring::RingBuffer;
