//! Bit-granular n-gram collection.
//!
//! A window of `8 * D` bits slides over each selected byte range one bit at a
//! time. Bytes stream through a [`RingBuffer`] of fixed capacity `C`, so a
//! range of any length is processed in `O(C)` memory. The front cursor tracks
//! the last bit of the window, the tail cursor its first bit. Whenever the
//! front wraps, the region `[0, C - D)` is refilled; whenever the tail wraps,
//! `[C - D, C)` is refilled. The tail always trails the front by `D` bytes, so
//! a refill never overwrites a byte the current window still needs.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::analysis::ring::{BitCursor, RingBuffer};
use crate::error::{EngineError, Result};
use crate::model::{Dimension, RegionSet, SectionDescriptor, TokenTable};

/// Streams selected regions through a ring buffer into a [`TokenTable`].
#[derive(Debug)]
pub struct NGramCollector {
    dimension: Dimension,
    ring: RingBuffer,
}

impl NGramCollector {
    /// `capacity` must hold at least two windows (`2 * D` bytes).
    pub fn new(dimension: Dimension, capacity: usize) -> Result<Self> {
        let min = 2 * dimension.bytes();
        if capacity < min {
            return Err(EngineError::InvalidConfig(format!(
                "ring capacity must be at least {min} bytes for dimension {dimension}, got {capacity}"
            )));
        }
        Ok(Self { dimension, ring: RingBuffer::with_capacity(capacity)? })
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Collect every range of every region into one table.
    ///
    /// Range offsets are `section.raw_offset + begin * 256`; the length is the
    /// full block count, so the last range may read past the section's raw
    /// data into whatever follows it in the file.
    pub fn collect<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        path: &Path,
        sections: &[SectionDescriptor],
        regions: &RegionSet,
    ) -> Result<TokenTable> {
        let mut table = TokenTable::new(self.dimension);
        for region in &regions.regions {
            let section = sections.get(region.section).ok_or_else(|| {
                EngineError::Format(format!("region refers to missing section #{}", region.section))
            })?;
            for range in &region.ranges {
                let offset = range.byte_offset(section);
                let len = range.byte_len();
                let emitted = self.collect_range(reader, path, offset, len, &mut table)?;
                debug!(
                    section = region.section,
                    begin = range.begin(),
                    end = range.end(),
                    offset,
                    tokens = emitted,
                    "collected range"
                );
            }
        }
        Ok(table)
    }

    /// Slide the window over `len` bytes starting at file offset `offset`.
    ///
    /// Returns the number of windows visited, dummies included
    /// (`8 * len - 8 * D + 1`, or zero when `len < D`).
    pub fn collect_range<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        path: &Path,
        offset: u64,
        len: u64,
        table: &mut TokenTable,
    ) -> Result<u64> {
        let d = self.dimension.bytes();
        let width = self.dimension.bits();
        let capacity = self.ring.capacity();
        if len < d as u64 {
            return Ok(0);
        }

        reader.seek(SeekFrom::Start(offset)).map_err(|e| EngineError::io("seek", path, e))?;
        self.ring.fill(reader, path, 0, len.min(capacity as u64) as usize)?;

        // Region-relative index of the byte under the front cursor.
        let mut consumed = (d - 1) as u64;
        let mut front = BitCursor::new(d - 1, 0);
        let mut tail = BitCursor::new(0, 7);
        let mut emitted = 0u64;

        loop {
            table.observe(self.ring.read_bits(tail, width))?;
            emitted += 1;

            if front.bit == 0 {
                consumed += 1;
                if consumed == len {
                    break;
                }
            }
            if front.step(capacity) && front.byte == 0 {
                let n = ((capacity - d) as u64).min(len - consumed) as usize;
                self.ring.fill(reader, path, 0, n)?;
            }

            if tail.step(capacity) && tail.byte == 0 {
                let n = (d as u64).min(len - consumed) as usize;
                self.ring.fill(reader, path, capacity - d, n)?;
            }
        }

        Ok(emitted)
    }
}
