//! Fixed-capacity circular byte buffer with bit-precise cursors.

use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{EngineError, Result};

/// Position of a single bit inside a [`RingBuffer`].
///
/// `bit` counts from the most significant bit (7) down to the least (0), so
/// walking a cursor forward visits bits in big-endian order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitCursor {
    pub byte: usize,
    pub bit: u8,
}

impl BitCursor {
    pub fn new(byte: usize, bit: u8) -> Self {
        debug_assert!(bit < 8);
        Self { byte, bit }
    }

    /// Step to the next bit, wrapping the byte index at `capacity`.
    ///
    /// Returns `true` when the step moved onto a new byte.
    #[inline]
    pub fn step(&mut self, capacity: usize) -> bool {
        if self.bit == 0 {
            self.bit = 7;
            self.byte += 1;
            if self.byte == capacity {
                self.byte = 0;
            }
            true
        } else {
            self.bit -= 1;
            false
        }
    }
}

/// Circular read-ahead buffer. Only ever holds `capacity` bytes.
#[derive(Debug)]
pub struct RingBuffer {
    bytes: Vec<u8>,
}

impl RingBuffer {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity).map_err(|e| EngineError::alloc("ring buffer", e))?;
        bytes.resize(capacity, 0);
        Ok(Self { bytes })
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn bit(&self, at: BitCursor) -> u64 {
        ((self.bytes[at.byte] >> at.bit) & 1) as u64
    }

    /// Pack `width` bits starting at `start` into a big-endian integer.
    #[inline]
    pub fn read_bits(&self, start: BitCursor, width: usize) -> u64 {
        let mut cursor = start;
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | self.bit(cursor);
            cursor.step(self.capacity());
        }
        value
    }

    /// Load `len` bytes from `source` into `[at, at + len)`.
    ///
    /// Bytes the source cannot supply (end of file) read as zero.
    pub fn fill<R: Read>(
        &mut self,
        source: &mut R,
        path: &Path,
        at: usize,
        len: usize,
    ) -> Result<()> {
        let dst = &mut self.bytes[at..at + len];
        let mut filled = 0;
        while filled < len {
            match source.read(&mut dst[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(EngineError::io("read", path, e)),
            }
        }
        dst[filled..].fill(0);
        Ok(())
    }
}
