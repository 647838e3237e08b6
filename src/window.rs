//! Power-of-two sliding window shared by the MSZIP and Quantum decoders

use crate::{MsDecompError, Result};

/// Circular history buffer with a write cursor modulo its capacity
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    buffer: Vec<u8>,
    mask: usize,
    position: usize,
    written: u64,
}

impl SlidingWindow {
    /// Create a window of `capacity` bytes; `capacity` must be a power of two
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            buffer: vec![0; capacity],
            mask: capacity - 1,
            position: 0,
            written: 0,
        }
    }

    /// Forget all history; the buffer itself is reused
    pub fn reset(&mut self) {
        self.position = 0;
        self.written = 0;
    }

    /// Window size in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Current write cursor
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total bytes written since the last reset
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Bytes of valid history a back-reference may reach
    pub fn filled(&self) -> usize {
        self.written.min(self.buffer.len() as u64) as usize
    }

    /// Append one byte
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
        self.written += 1;
    }

    /// Append a slice of literal bytes
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Copy `length` bytes starting `distance` bytes behind the cursor.
    ///
    /// Each step copies a run that stays inside the buffer at both ends and is
    /// no longer than `distance`, so overlapping matches repeat their source
    /// the way a byte-by-byte LZ77 copy does.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 {
            return Err(MsDecompError::CorruptData("zero match distance"));
        }
        if distance > self.filled() {
            return Err(MsDecompError::CorruptData(
                "match distance exceeds window contents",
            ));
        }

        let capacity = self.buffer.len();
        let mut source = (self.position + capacity - distance) & self.mask;
        let mut remaining = length;
        while remaining > 0 {
            let run = remaining
                .min(capacity - source)
                .min(capacity - self.position)
                .min(distance);
            self.buffer.copy_within(source..source + run, self.position);
            source = (source + run) & self.mask;
            self.position = (self.position + run) & self.mask;
            remaining -= run;
        }
        self.written += length as u64;
        Ok(())
    }

    /// The `len` bytes ending at the cursor, as one contiguous slice.
    ///
    /// A cursor of 0 is treated as the end of the buffer, so a run that just
    /// filled the window up to its last byte is still addressable.
    pub fn recent(&self, len: usize) -> Result<&[u8]> {
        let end = if self.position == 0 && self.written > 0 {
            self.buffer.len()
        } else {
            self.position
        };
        if len > end || len > self.filled() {
            return Err(MsDecompError::CorruptData(
                "requested output crosses the window start",
            ));
        }
        Ok(&self.buffer[end - len..end])
    }
}
