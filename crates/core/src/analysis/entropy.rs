//! Per-section entropy profiling.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::model::{EntropyProfile, SectionDescriptor, BLOCK_SIZE};

/// Shannon entropy of one block, in bits per byte.
///
/// The denominator is always [`BLOCK_SIZE`]; a short block is treated as if
/// its missing tail bytes were `0x00`.
pub fn block_entropy(block: &[u8]) -> f64 {
    debug_assert!(block.len() <= BLOCK_SIZE);
    let mut histogram = [0usize; 256];
    for &byte in block {
        histogram[byte as usize] += 1;
    }
    histogram[0] += BLOCK_SIZE - block.len().min(BLOCK_SIZE);

    let total = BLOCK_SIZE as f64;
    let mut entropy = 0.0;
    for &count in &histogram {
        if count == 0 {
            continue;
        }
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }
    entropy
}

/// Profile one section. Empty sections have no profile.
///
/// A section whose raw data runs past the end of the file is an I/O error.
pub fn profile_section<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
    section: &SectionDescriptor,
) -> Result<Option<EntropyProfile>> {
    if section.is_empty() {
        return Ok(None);
    }

    reader
        .seek(SeekFrom::Start(section.raw_offset))
        .map_err(|e| EngineError::io("seek", path, e))?;

    let num_blocks = section.num_blocks();
    let mut blocks = Vec::new();
    blocks.try_reserve_exact(num_blocks).map_err(|e| EngineError::alloc("entropy profile", e))?;

    let mut buf = [0u8; BLOCK_SIZE];
    let mut remaining = section.raw_size;
    while remaining > 0 {
        let len = remaining.min(BLOCK_SIZE as u64) as usize;
        reader.read_exact(&mut buf[..len]).map_err(|e| EngineError::io("read", path, e))?;
        blocks.push(block_entropy(&buf[..len]));
        remaining -= len as u64;
    }

    let profile = EntropyProfile::from_blocks(section.index, blocks);
    if let Some(p) = &profile {
        debug!(
            section = section.index,
            name = %section.name,
            blocks = p.num_blocks(),
            avg = p.avg,
            "profiled section"
        );
    }
    Ok(profile)
}

/// Profile every section, keeping positions aligned with `sections`.
pub fn profile_sections<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
    sections: &[SectionDescriptor],
) -> Result<Vec<Option<EntropyProfile>>> {
    sections.iter().map(|section| profile_section(reader, path, section)).collect()
}
